// Library entrypoint for the binary and integration tests.
pub mod api;
pub mod channels;
mod core;
pub mod services;
pub mod storage;

pub use api::build_router;
pub use channels::TrickBot;
pub use self::core::{config, shutdown, state};
