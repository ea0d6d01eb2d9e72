//! Blocking network I/O behind a trait seam.
//!
//! `UreqTransport` is the production implementation. It disables ureq's
//! status-code-as-error behaviour so 4xx/5xx responses come back as data;
//! only failures of the exchange itself become `HarnessError::Transport`.

use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::http::{HeaderSet, HttpMethod, HttpRequest, HttpResponse};

/// Executes one `HttpRequest`, blocking the calling thread until done.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let headers = &request.headers;

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        };

        let mut response = result.map_err(|e| match e {
            ureq::Error::Http(e) => HarnessError::Config(format!("invalid request: {e}")),
            e => HarnessError::transport(url, e),
        })?;
        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| HarnessError::transport(url, e))?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &HeaderSet) -> ureq::RequestBuilder<B> {
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_header_is_a_config_error_before_connecting() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/users/2".to_string(),
            headers: [("bad header", "v")].into_iter().collect(),
            body: None,
        };
        let err = UreqTransport::default().send(&request).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
        assert!(!err.is_transport());
    }
}
