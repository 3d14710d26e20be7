//! GCM push client and UTM link tagger
//!
//! Two independent utilities: [`gcm`] sends push notifications to batches of
//! device registration ids, and [`tags`] appends campaign tracking
//! parameters to links in HTML fragments.

pub mod config;
pub mod errors;
pub mod gcm;
pub mod tags;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigManager};
pub use errors::{AppError, AppResult};
pub use gcm::{BatchResult, GcmClient, SendRequest};
pub use tags::UtmTagger;
