//! Normalized outcome of one executed request.

use std::time::Duration;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::http::{HeaderSet, HttpResponse};

/// Status, headers and raw body text of a completed exchange.
///
/// Any status is a valid `Response`; 4xx/5xx are data, not errors. The
/// structured view is parsed on first access to `json()` and cached. A body
/// that is not valid JSON yields `None` rather than an error.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderSet,
    body: String,
    elapsed: Duration,
    json: OnceCell<Option<Value>>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            body: body.into(),
            elapsed: Duration::ZERO,
            json: OnceCell::new(),
        }
    }

    pub(crate) fn from_http(raw: HttpResponse, elapsed: Duration) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            elapsed,
            json: OnceCell::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Wall time from dispatch until the body was fully read.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| serde_json::from_str(&self.body).ok())
            .as_ref()
    }

    /// Top-level field of a JSON object body.
    pub fn json_field(&self, key: &str) -> Option<&Value> {
        self.json()?.get(key)
    }
}
