//! `RecordsApi` over HTTP, using a blocking ureq agent

use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use ureq::{Agent, AgentBuilder, Request};

use placaview_types::{
    CleanupReport, ConfigError, DeleteResponse, Error, ExitResponse, HealthStatus, PlateRecord,
    PlateUpdate, Result, SearchRequest, UploadPayload, UploadResponse,
};

use crate::multipart::MultipartForm;
use crate::RecordsApi;

/// Fixed per-request timeout (image recognition is slow)
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Record count requested when the caller does not choose one
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Backend address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const RECORDS_PATH: &str = "/api/placas";

/// Blocking client bound to one backend base URL
#[derive(Clone)]
pub struct HttpClient {
    agent: Agent,
    base_url: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(base_url.to_string()).into());
        }

        Ok(Self::with_base_url(base_url))
    }

    fn with_base_url(base_url: &str) -> Self {
        let agent = AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("placaview/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> Request {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.agent.request(method, &url)
    }

    fn record_path(id: &str) -> Result<String> {
        Self::records_subpath("", id)
    }

    /// `/api/placas/{prefix}{id}`, rejecting an empty id
    fn records_subpath(prefix: &str, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("record id is empty".to_string()));
        }
        Ok(format!("{}/{}{}", RECORDS_PATH, prefix, encode_segment(id)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl RecordsApi for HttpClient {
    fn upload(&self, payload: &UploadPayload) -> Result<UploadResponse> {
        debug!("uploading {}", payload.describe());
        let form = match payload {
            UploadPayload::File {
                filename,
                content_type,
                bytes,
            } => MultipartForm::new().file("image", filename, content_type, bytes),
            UploadPayload::Frame { data_url } => MultipartForm::new().text("image_base64", data_url),
        };
        let content_type = form.content_type();
        let body = form.finish();

        let response = self
            .request("POST", &format!("{}/upload", RECORDS_PATH))
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        read_json(response)
    }

    fn list(&self, limit: u32) -> Result<Vec<PlateRecord>> {
        let response = self
            .request("GET", &format!("{}/", RECORDS_PATH))
            .query("limit", &limit.to_string())
            .call();
        read_json(response)
    }

    fn get(&self, id: &str) -> Result<PlateRecord> {
        read_json(self.request("GET", &Self::record_path(id)?).call())
    }

    fn search(&self, plate: &str) -> Result<PlateRecord> {
        let body = SearchRequest {
            plate: plate.to_string(),
        };
        let response = self
            .request("POST", &format!("{}/search", RECORDS_PATH))
            .send_json(&body);
        read_json(response)
    }

    fn update(&self, id: &str, update: &PlateUpdate) -> Result<PlateRecord> {
        read_json(self.request("PUT", &Self::record_path(id)?).send_json(update))
    }

    fn delete(&self, id: &str) -> Result<DeleteResponse> {
        read_json(self.request("DELETE", &Self::record_path(id)?).call())
    }

    fn register_exit(&self, id: &str) -> Result<ExitResponse> {
        read_json(self.request("POST", &Self::records_subpath("clear/", id)?).call())
    }

    fn health(&self) -> Result<HealthStatus> {
        read_json(self.request("GET", "/health").call())
    }

    fn clean_invalid(&self) -> Result<CleanupReport> {
        read_json(self.request("GET", &format!("{}/admin/clean", RECORDS_PATH)).call())
    }
}

/// Decode a 2xx body, or turn the failure into a typed error
fn read_json<T: DeserializeOwned>(
    response: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<T> {
    match response {
        Ok(response) => Ok(serde_json::from_reader(response.into_reader())?),
        Err(ureq::Error::Status(status, response)) => {
            let detail = error_detail(response);
            warn!("backend answered {}: {}", status, detail);
            if status == 404 {
                Err(Error::NotFound(detail))
            } else {
                Err(Error::Api { status, detail })
            }
        }
        Err(ureq::Error::Transport(transport)) => {
            warn!("request failed: {}", transport);
            Err(Error::Transport(transport.to_string()))
        }
    }
}

/// Pull `detail` out of an error body; falls back to the raw text
fn error_detail(response: ureq::Response) -> String {
    let body = response.into_string().unwrap_or_default();
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

/// Percent-encode one path segment (RFC 3986 unreserved characters pass through)
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpClient::new(" http://localhost:8000/ ").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_base_url_requires_http_scheme() {
        let err = HttpClient::new("localhost:8000").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_default_points_at_local_backend() {
        assert_eq!(HttpClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("66b1f0c2a4"), "66b1f0c2a4");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_empty_id_is_rejected_before_any_request() {
        let client = HttpClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(client.get("  "), Err(Error::InvalidInput(_))));
        assert!(matches!(client.delete(""), Err(Error::InvalidInput(_))));
        assert!(matches!(client.register_exit(" "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_record_paths() {
        assert_eq!(HttpClient::record_path("ab c").unwrap(), "/api/placas/ab%20c");
        assert_eq!(
            HttpClient::records_subpath("clear/", "66b1").unwrap(),
            "/api/placas/clear/66b1"
        );
    }
}
