//! Immutable description of one HTTP call.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::http::{HeaderSet, HttpMethod};

/// Input for `RequestExecutor::execute`: method, relative path, optional
/// JSON object body, per-call header overrides and the encryption flag.
///
/// Built once per call with the consuming `with_*` methods and only read
/// afterwards, so a slice of descriptors can be shared across fan-out
/// workers without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Map<String, Value>>,
    pub headers: HeaderSet,
    pub encrypt: bool,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            body: None,
            headers: HeaderSet::new(),
            encrypt: false,
        }
    }

    /// Build from a method name, rejecting anything but GET/POST/PUT/DELETE.
    pub fn parse(method: &str, path: &str) -> Result<Self> {
        Ok(Self::new(method.parse()?, path))
    }

    pub fn get(path: &str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: &str, body: Map<String, Value>) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    pub fn put(path: &str, body: Map<String, Value>) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = self.headers.overlay(&headers);
        self
    }

    /// Ask for the body to be replaced by an encrypted envelope.
    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }
}
