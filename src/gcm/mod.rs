//! Push messaging client
//!
//! Sends a message to a list of device registration ids through the cloud
//! messaging HTTP endpoint. Device lists larger than the per-request cap are
//! split into batches, posted one after another, and the per-batch responses
//! are merged into a single [`BatchResult`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gcm_tags::gcm::{GcmClient, SendRequest};
//!
//! # fn main() -> Result<(), gcm_tags::errors::AppError> {
//! let mut client = GcmClient::new("AIzaSy-server-key")?;
//! client.set_devices(["device-token-1", "device-token-2"]);
//!
//! let request = SendRequest::new("Your order has shipped")
//!     .with_title("Order update")
//!     .with_data("order_id", "A-1001");
//! let result = client.send(&request)?;
//! println!("{} delivered, {} failed", result.success, result.failure);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{GcmClient, GcmClientConfig, DEFAULT_ENDPOINT, MAX_DEVICES_PER_REQUEST};
pub use types::{ApiKey, BatchResult, DeviceResult, SendRequest, MIN_API_KEY_LEN};
