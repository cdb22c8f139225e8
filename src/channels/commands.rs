use crate::storage::TrickFields;

pub const CMD_TRICKS: &str = "Tricks";
pub const CMD_NEW_TRICK: &str = "NewTrick";
pub const CMD_DIARY_OVERVIEW: &str = "TagebuchUebersicht";
pub const CMD_DIARY_ENTRY: &str = "TagebuchEintrag";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Tricks,
    NewTrick { args: String },
    DiaryOverview,
    DiaryEntry,
    Unknown,
}

impl BotCommand {
    /// Reads `/Command` or `/Command@botname` at the start of the text.
    /// Everything after the first whitespace is the argument string.
    pub fn parse(text: &str) -> Self {
        let text = text.trim_start();
        let Some(rest) = text.strip_prefix('/') else {
            return Self::Unknown;
        };
        let (token, args) = match rest.split_once(char::is_whitespace) {
            Some((token, args)) => (token, args.trim()),
            None => (rest, ""),
        };
        let name = token.split_once('@').map_or(token, |(name, _)| name);
        match name {
            CMD_TRICKS => Self::Tricks,
            CMD_NEW_TRICK => Self::NewTrick {
                args: args.to_string(),
            },
            CMD_DIARY_OVERVIEW => Self::DiaryOverview,
            CMD_DIARY_ENTRY => Self::DiaryEntry,
            _ => Self::Unknown,
        }
    }
}

/// Comma-separated trick fields. Five fields are
/// `name, translated name, description, difficulty, progress`; four omit
/// the translated name. Any other count is rejected.
pub fn parse_trick_fields(args: &str) -> Option<TrickFields> {
    let parts: Vec<String> = args
        .split(',')
        .map(|part| part.trim().to_string())
        .collect();
    let mut parts = parts.into_iter();
    let fields = match parts.len() {
        5 => TrickFields {
            name: parts.next()?,
            translated_name: parts.next()?,
            description: parts.next()?,
            difficulty: parts.next()?,
            progress: parts.next()?,
        },
        4 => TrickFields {
            name: parts.next()?,
            translated_name: String::new(),
            description: parts.next()?,
            difficulty: parts.next()?,
            progress: parts.next()?,
        },
        _ => return None,
    };
    Some(fields)
}
