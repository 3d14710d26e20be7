//! Centralized error handling module
//!
//! Library code returns [`AppResult`]; the binary wraps these in `anyhow`.

pub mod types;

pub use types::{AppError, AppResult};
