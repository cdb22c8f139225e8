use axum::http::header::{HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;
use uuid::Uuid;

pub(crate) const TRACE_HEADER: &str = "x-trace-id";
pub(crate) const ERROR_CODE_HEADER: &str = "x-error-code";

pub(crate) const CODE_INVALID_JSON: &str = "INVALID_JSON";
pub(crate) const CODE_INVALID_TRICK_ID: &str = "INVALID_TRICK_ID";
pub(crate) const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

pub(crate) fn invalid_json(err: serde_json::Error) -> Response {
    error_response_with_code(
        StatusCode::BAD_REQUEST,
        CODE_INVALID_JSON,
        format!("invalid trick payload: {err}"),
    )
}

pub(crate) fn invalid_id(raw: &str) -> Response {
    error_response_with_code(
        StatusCode::BAD_REQUEST,
        CODE_INVALID_TRICK_ID,
        format!("Invalid Trick ID: {raw}"),
    )
}

/// The cause is logged, never returned to the client.
pub(crate) fn storage_error(err: anyhow::Error) -> Response {
    error!("trick storage failed: {err:#}");
    error_response_with_code(
        StatusCode::INTERNAL_SERVER_ERROR,
        CODE_INTERNAL_ERROR,
        "Internal Server Error",
    )
}

#[derive(Debug, Clone)]
pub(crate) struct ErrorMeta {
    pub code: String,
    pub message: String,
    pub status: u16,
    pub hint: String,
    pub trace_id: String,
    pub timestamp: f64,
}

impl ErrorMeta {
    pub(crate) fn to_value(&self) -> Value {
        json!({
            "code": self.code,
            "message": self.message,
            "status": self.status,
            "hint": self.hint,
            "trace_id": self.trace_id,
            "timestamp": self.timestamp,
        })
    }
}

pub(crate) fn build_error_meta(
    status: StatusCode,
    code: Option<&str>,
    message: impl Into<String>,
) -> ErrorMeta {
    let message = message.into();
    let code = code
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_error_code(status))
        .to_string();
    let hint = hint_for_error_code(&code)
        .unwrap_or_else(|| default_hint(status))
        .to_string();
    ErrorMeta {
        code,
        message,
        status: status.as_u16(),
        hint,
        trace_id: format!("err_{}", Uuid::new_v4().simple()),
        timestamp: now_unix_seconds(),
    }
}

pub(crate) fn hint_for_error_code(code: &str) -> Option<&'static str> {
    let normalized = code.trim().to_ascii_uppercase();
    match normalized.as_str() {
        CODE_INVALID_JSON => Some("Send a JSON trick object encoded in UTF-8."),
        CODE_INVALID_TRICK_ID => Some("Use the integer id returned when the trick was created."),
        _ => None,
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    build_error_response(status, build_error_meta(status, None, message))
}

pub fn error_response_with_code(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> Response {
    build_error_response(status, build_error_meta(status, Some(code), message))
}

fn build_error_response(status: StatusCode, meta: ErrorMeta) -> Response {
    let payload = json!({
        "ok": false,
        "error": meta.to_value(),
        "detail": { "message": meta.message },
    });

    let mut response = (status, Json(payload)).into_response();
    if let Ok(value) = HeaderValue::from_str(&meta.trace_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TRACE_HEADER), value);
    }
    if let Ok(value) = HeaderValue::from_str(&meta.code) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(ERROR_CODE_HEADER), value);
    }
    response
}

fn default_error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        _ if status.is_server_error() => CODE_INTERNAL_ERROR,
        _ => "REQUEST_ERROR",
    }
}

fn default_hint(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Verify request parameters and payload format.",
        StatusCode::NOT_FOUND => "Verify requested resource path or identifier.",
        _ if status.is_server_error() => "Retry later or check the server log with trace_id.",
        _ => "Inspect request and try again.",
    }
}

fn now_unix_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs_f64())
        .unwrap_or(0.0)
}
