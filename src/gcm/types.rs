//! Request and response types for the messaging client

use crate::errors::{AppError, AppResult};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Minimum accepted length of a server API key
pub const MIN_API_KEY_LEN: usize = 8;

/// Server API key, validated on construction
///
/// The key must be at least [`MIN_API_KEY_LEN`] bytes long and usable as an
/// HTTP header value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    key: String,
    header: HeaderValue,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> AppResult<Self> {
        let key = key.into();
        if key.len() < MIN_API_KEY_LEN {
            return Err(AppError::invalid_credential(format!(
                "expected at least {MIN_API_KEY_LEN} characters, got {}",
                key.len()
            )));
        }

        let mut header = HeaderValue::from_str(&format!("key={key}")).map_err(|_| {
            AppError::invalid_credential("contains characters not allowed in an HTTP header")
        })?;
        header.set_sensitive(true);

        Ok(Self { key, header })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Value of the `Authorization` header
    pub(crate) fn authorization(&self) -> &HeaderValue {
        &self.header
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// A push message sent to every registered device
///
/// Extra data fields are merged into the `data` object after `message` and
/// `title`, so they may override either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendRequest {
    pub message: String,
    pub title: Option<String>,
    pub data: Map<String, Value>,
}

impl SendRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Builds the `data` object shared by every batch
    pub fn data_payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("message".to_string(), Value::String(self.message.clone()));

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            data.insert("title".to_string(), Value::String(title.to_string()));
        }

        for (key, value) in &self.data {
            data.insert(key.clone(), value.clone());
        }

        Value::Object(data)
    }
}

/// Outcome for a single registration id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decoded send response, either for one batch or aggregated over all of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_id: Option<i64>,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failure: u64,
    #[serde(default)]
    pub canonical_ids: u64,
    #[serde(default)]
    pub results: Vec<DeviceResult>,
}

impl BatchResult {
    /// Folds another batch into this one. Counters are summed, results are
    /// appended in order and the first multicast id is kept.
    pub fn merge(&mut self, other: BatchResult) {
        if self.multicast_id.is_none() {
            self.multicast_id = other.multicast_id;
        }
        self.success += other.success;
        self.failure += other.failure;
        self.canonical_ids += other.canonical_ids;
        self.results.extend(other.results);
    }

    /// Registration ids the backend asks the caller to replace, paired with
    /// the index of the device in the send order.
    pub fn canonical_updates(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.registration_id.as_deref().map(|id| (i, id)))
    }
}
