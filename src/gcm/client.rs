use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::error;

use super::types::{ApiKey, BatchResult, SendRequest};
use crate::errors::{AppError, AppResult};

/// Fixed send endpoint of the cloud messaging service
pub const DEFAULT_ENDPOINT: &str = "https://android.googleapis.com/gcm/send";

/// Maximum number of registration ids accepted in a single request
pub const MAX_DEVICES_PER_REQUEST: usize = 1000;

/// Configuration for the messaging client
#[derive(Debug, Clone)]
pub struct GcmClientConfig {
    pub endpoint: String,
    /// `None` keeps the transport default
    pub timeout_secs: Option<u64>,
    pub batch_size: usize,
    pub user_agent: Option<String>,
}

impl Default for GcmClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            batch_size: MAX_DEVICES_PER_REQUEST,
            user_agent: Some(concat!("gcm-tags/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// Blocking client for the push messaging endpoint
///
/// Holds the API key and the list of target devices. Each [`send`](Self::send)
/// issues one POST per batch of at most [`MAX_DEVICES_PER_REQUEST`] devices,
/// sequentially, and never retries.
pub struct GcmClient {
    client: Client,
    api_key: ApiKey,
    devices: Vec<String>,
    config: GcmClientConfig,
}

impl GcmClient {
    /// Create a client for the default endpoint
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_config(api_key, GcmClientConfig::default())
    }

    /// Create a client with explicit configuration
    pub fn with_config(api_key: impl Into<String>, config: GcmClientConfig) -> AppResult<Self> {
        let api_key = ApiKey::new(api_key)?;

        let mut client_builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            client_builder = client_builder.timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &config.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }

        let client = client_builder
            .build()
            .map_err(|e| AppError::transport(&config.endpoint, e))?;

        Ok(Self {
            client,
            api_key,
            devices: Vec::new(),
            config,
        })
    }

    /// Replace the device list
    pub fn set_devices<I, S>(&mut self, devices: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices = devices.into_iter().map(Into::into).collect();
    }

    pub fn add_device(&mut self, device: impl Into<String>) {
        self.devices.push(device.into());
    }

    pub fn add_devices<I, S>(&mut self, devices: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices.extend(devices.into_iter().map(Into::into));
    }

    pub fn clear_devices(&mut self) {
        self.devices.clear();
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn config(&self) -> &GcmClientConfig {
        &self.config
    }

    /// Number of requests a send would issue for the current device list
    pub fn batch_count(&self) -> usize {
        self.devices.len().div_ceil(self.batch_size())
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size.clamp(1, MAX_DEVICES_PER_REQUEST)
    }

    /// Send a message to every registered device
    ///
    /// Results of all batches are merged in batch order. The first failing
    /// batch aborts the whole send; results gathered so far are dropped.
    /// Nothing is logged unless a batch gets a non-OK status.
    pub fn send(&self, request: &SendRequest) -> AppResult<BatchResult> {
        if self.devices.is_empty() {
            return Err(AppError::NoDevices);
        }

        let data = request.data_payload();
        let headers = self.build_headers();
        let mut response = BatchResult::default();

        for batch in self.devices.chunks(self.batch_size()) {
            let payload = json!({
                "registration_ids": batch,
                "data": data,
            });

            let result = self.post(&headers, &payload)?;
            response.merge(result);
        }

        Ok(response)
    }

    /// Convenience wrapper for a message with an optional title
    pub fn send_message(&self, message: &str, title: Option<&str>) -> AppResult<BatchResult> {
        let mut request = SendRequest::new(message);
        request.title = title.map(str::to_string);
        self.send(&request)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.api_key.authorization().clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn post(&self, headers: &HeaderMap, payload: &Value) -> AppResult<BatchResult> {
        let url = &self.config.endpoint;

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .json(payload)
            .send()
            .map_err(|e| AppError::transport(url, e))?;

        let status = response.status();
        let body = response.text().map_err(|e| AppError::transport(url, e))?;

        if status != StatusCode::OK {
            let payload = payload.to_string();
            error!(
                status = status.as_u16(),
                url = %url,
                payload = %payload,
                body = %body,
                "Invalid response http code"
            );
            return Err(AppError::HttpStatus {
                status_code: status.as_u16(),
                url: url.clone(),
                payload,
                body,
            });
        }

        parse_response(&body)
    }
}

fn parse_response(body: &str) -> AppResult<BatchResult> {
    serde_json::from_str(body).map_err(|e| {
        AppError::invalid_response(format!("line {} column {}", e.line(), e.column()), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    const API_KEY: &str = "AIzaSyTestKey123";

    /// Shared sink for formatted log lines
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with a subscriber recording every event of this crate
    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("gcm_tags=trace")
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, logs)
    }

    fn client_for(server: &MockServer) -> GcmClient {
        let config = GcmClientConfig {
            endpoint: server.url("/gcm/send"),
            ..Default::default()
        };
        GcmClient::with_config(API_KEY, config).unwrap()
    }

    fn devices(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("dev-{i}")).collect()
    }

    #[test]
    fn test_short_api_key_rejected() {
        assert!(matches!(
            GcmClient::new("1234567"),
            Err(AppError::InvalidCredential { .. })
        ));
        assert!(GcmClient::new("12345678").is_ok());
    }

    #[test]
    fn test_device_list_management() {
        let mut client = GcmClient::new(API_KEY).unwrap();
        client.set_devices(["a", "b"]);
        client.add_device("c");
        client.add_devices(vec!["a".to_string(), "d".to_string()]);
        assert_eq!(client.devices(), ["a", "b", "c", "a", "d"]);

        client.set_devices(["x"]);
        assert_eq!(client.devices(), ["x"]);

        client.clear_devices();
        assert!(client.devices().is_empty());
    }

    #[test]
    fn test_batch_count() {
        let mut client = GcmClient::new(API_KEY).unwrap();
        assert_eq!(client.batch_count(), 0);
        client.set_devices(devices(1000));
        assert_eq!(client.batch_count(), 1);
        client.add_device("one-more");
        assert_eq!(client.batch_count(), 2);
        client.set_devices(devices(2500));
        assert_eq!(client.batch_count(), 3);
    }

    #[test]
    fn test_send_without_devices() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(200).json_body(json!({"success": 0}));
        });

        let client = client_for(&server);
        let result = client.send(&SendRequest::new("hello"));

        assert!(matches!(result, Err(AppError::NoDevices)));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_send_single_batch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/gcm/send")
                .header("authorization", "key=AIzaSyTestKey123")
                .header("content-type", "application/json")
                .body_includes("\"registration_ids\":[\"dev-0\",\"dev-1\"]")
                .body_includes("\"message\":\"hello\"")
                .body_includes("\"title\":\"News\"");
            then.status(200).json_body(json!({
                "multicast_id": 42,
                "success": 1,
                "failure": 1,
                "canonical_ids": 0,
                "results": [{"message_id": "0:1"}, {"error": "InvalidRegistration"}]
            }));
        });

        let mut client = client_for(&server);
        client.set_devices(devices(2));
        let result = client.send_message("hello", Some("News")).unwrap();

        assert_eq!(mock.calls(), 1);
        assert_eq!(result.multicast_id, Some(42));
        assert_eq!(result.success, 1);
        assert_eq!(result.failure, 1);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[1].error.as_deref(), Some("InvalidRegistration"));
    }

    #[test]
    fn test_send_aggregates_batches_in_order() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST).path("/gcm/send").body_includes("\"dev-0\"");
            then.status(200).json_body(json!({
                "success": 1000,
                "failure": 0,
                "canonical_ids": 1,
                "results": [{"message_id": "first"}]
            }));
        });
        let second = server.mock(|when, then| {
            when.method(POST).path("/gcm/send").body_includes("\"dev-1000\"");
            then.status(200).json_body(json!({
                "success": 499,
                "failure": 1,
                "canonical_ids": 0,
                "results": [{"message_id": "second"}, {"error": "NotRegistered"}]
            }));
        });

        let mut client = client_for(&server);
        client.set_devices(devices(1500));
        let result = client.send(&SendRequest::new("hello")).unwrap();

        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(result.success, 1499);
        assert_eq!(result.failure, 1);
        assert_eq!(result.success + result.failure, 1500);
        assert_eq!(result.canonical_ids, 1);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[0].message_id.as_deref(), Some("first"));
        assert_eq!(result.results[1].message_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_send_issues_ceil_batches() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(200).json_body(json!({
                "success": 2,
                "failure": 0,
                "canonical_ids": 0,
                "results": [{"message_id": "a"}, {"message_id": "b"}]
            }));
        });

        let mut client = client_for(&server);
        client.set_devices(devices(2001));
        let result = client.send(&SendRequest::new("hello")).unwrap();

        assert_eq!(mock.calls(), 3);
        assert_eq!(result.success, 6);
        assert_eq!(result.results.len(), 6);
    }

    #[test]
    fn test_http_error_aborts_send() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST).path("/gcm/send").body_includes("\"dev-0\"");
            then.status(401).body("Unauthorized");
        });
        let second = server.mock(|when, then| {
            when.method(POST).path("/gcm/send").body_includes("\"dev-1000\"");
            then.status(200).json_body(json!({"success": 1}));
        });

        let mut client = client_for(&server);
        client.set_devices(devices(1001));
        let err = client.send(&SendRequest::new("hello")).unwrap_err();

        match err {
            AppError::HttpStatus { status_code, url, payload, body } => {
                assert_eq!(status_code, 401);
                assert_eq!(url, server.url("/gcm/send"));
                assert!(payload.contains("\"dev-0\""));
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("Expected HttpStatus, got {other:?}"),
        }
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_non_ok_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(201).json_body(json!({"success": 1}));
        });

        let mut client = client_for(&server);
        client.add_device("dev-0");
        let err = client.send(&SendRequest::new("hello")).unwrap_err();
        assert!(matches!(err, AppError::HttpStatus { status_code: 201, .. }));
    }

    #[test]
    fn test_invalid_json_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(200).body("<html>not json</html>");
        });

        let mut client = client_for(&server);
        client.add_device("dev-0");
        let err = client.send(&SendRequest::new("hello")).unwrap_err();
        assert!(matches!(err, AppError::InvalidResponseFormat { .. }));
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_transport_error() {
        let config = GcmClientConfig {
            endpoint: "http://127.0.0.1:1/gcm/send".to_string(),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let mut client = GcmClient::with_config(API_KEY, config).unwrap();
        client.add_device("dev-0");

        let err = client.send(&SendRequest::new("hello")).unwrap_err();
        assert!(matches!(err, AppError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_custom_batch_size() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(200).json_body(json!({"success": 1, "results": [{}]}));
        });

        let config = GcmClientConfig {
            endpoint: server.url("/gcm/send"),
            batch_size: 2,
            ..Default::default()
        };
        let mut client = GcmClient::with_config(API_KEY, config).unwrap();
        client.set_devices(devices(5));
        let result = client.send(&SendRequest::new("hello")).unwrap();

        assert_eq!(mock.calls(), 3);
        assert_eq!(result.success, 3);
    }

    #[test]
    fn test_successful_send_logs_nothing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(200).json_body(json!({"success": 1, "results": [{"message_id": "m"}]}));
        });

        let mut client = client_for(&server);
        client.add_device("dev-0");
        let (result, logs) = capture_logs(|| client.send(&SendRequest::new("hello")));

        assert_eq!(result.unwrap().success, 1);
        assert_eq!(logs, "");
    }

    #[test]
    fn test_http_error_logs_request_and_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/gcm/send");
            then.status(503).body("Service Unavailable");
        });

        let mut client = client_for(&server);
        client.add_device("dev-0");
        let (result, logs) = capture_logs(|| client.send(&SendRequest::new("hello")));

        assert!(matches!(result, Err(AppError::HttpStatus { status_code: 503, .. })));
        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 1, "{logs}");
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains(&server.url("/gcm/send")));
        assert!(lines[0].contains("\"registration_ids\":[\"dev-0\"]"));
        assert!(lines[0].contains("Service Unavailable"));
    }
}
