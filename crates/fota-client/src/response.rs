//! Raw response captured for contract assertions

use bytes::Bytes;
use fota_core::ApiErrorKind;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{FotaClientError, Result};

/// Status, headers and the complete body of one exchange.
///
/// The body is read eagerly; decoding is deferred until the caller asks for
/// a shape, so a scenario can assert on the status first and report the
/// literal body when the shape is wrong.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Numeric status code
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Error classification, `None` for 2xx/3xx
    pub fn kind(&self) -> Option<ApiErrorKind> {
        if self.status.is_client_error() || self.status.is_server_error() {
            Some(ApiErrorKind::from_status(self.status()))
        } else {
            None
        }
    }

    /// Decode the body as `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            FotaClientError::ParseError(format!("{}; body: {}", e, self.text_preview()))
        })
    }

    /// Decode the body as untyped JSON
    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    /// Body as text, lossy for non-UTF-8 bytes
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// At most 200 characters of the body, for messages
    pub fn text_preview(&self) -> String {
        let text = self.text();
        match text.char_indices().nth(200) {
            Some((cut, _)) => format!("{}…", &text[..cut]),
            None => text,
        }
    }

    /// Decode a success body, or turn an error status into [`FotaClientError::Api`]
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        self.error_for_status()?.json()
    }

    /// Keep a success response, or turn an error status into [`FotaClientError::Api`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(FotaClientError::api(self.status(), self.error_message()))
    }

    fn error_message(&self) -> String {
        let from_json = serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| {
                ["error", "message", "detail"]
                    .iter()
                    .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
            });
        match from_json {
            Some(message) => message,
            None if self.body.is_empty() => format!("HTTP {}", self.status),
            None => self.text_preview(),
        }
    }
}
