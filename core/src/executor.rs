//! Single-request execution: resolve, merge headers, encrypt, dispatch.
//!
//! # Design
//! `build` turns a `RequestDescriptor` into a plain-data `HttpRequest` with
//! no I/O, and `execute` hands that request to the configured `Transport`.
//! The split keeps request construction assertable without a server.
//!
//! Every call is independent and synchronous: no caching, no retry. A
//! 4xx/5xx status is returned as a `Response`; only an unsupported method,
//! a configuration problem or a transport fault becomes an `Err`.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::codec::CryptoCodec;
use crate::config::HarnessConfig;
use crate::descriptor::RequestDescriptor;
use crate::error::{HarnessError, Result};
use crate::http::{HeaderSet, HttpMethod, HttpRequest};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// Per-call extras for `RequestExecutor::request`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderSet,
    pub encrypt: bool,
}

/// Issues one HTTP call per `execute`, sharing config, codec and transport
/// read-only across threads.
pub struct RequestExecutor {
    config: Arc<HarnessConfig>,
    codec: Option<CryptoCodec>,
    default_headers: HeaderSet,
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    /// Executor backed by a blocking ureq agent honouring `config.timeout`.
    pub fn new(config: Arc<HarnessConfig>) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: Arc<HarnessConfig>, transport: Arc<dyn Transport>) -> Result<Self> {
        let codec = config.secret_key.as_ref().map(CryptoCodec::new).transpose()?;
        let default_headers = config.default_headers();
        Ok(Self {
            config,
            codec,
            default_headers,
            transport,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The codec built from the configured key, if there is one.
    pub fn codec(&self) -> Option<&CryptoCodec> {
        self.codec.as_ref()
    }

    /// Resolve `descriptor` into the exact request the transport will send.
    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest> {
        let url = self.config.url_for(&descriptor.path);
        let headers = self.default_headers.clone().overlay(&descriptor.headers);
        headers.validate()?;
        let body = match (&descriptor.body, descriptor.method.carries_body()) {
            (Some(body), true) => Some(self.encode_body(body, descriptor.encrypt)?),
            _ => None,
        };
        Ok(HttpRequest {
            method: descriptor.method,
            url,
            headers,
            body,
        })
    }

    pub fn execute(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let request = self.build(descriptor)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            encrypted = descriptor.encrypt,
            "sending request"
        );

        let started = Instant::now();
        let raw = self.transport.send(&request).map_err(|e| {
            tracing::warn!(method = %request.method, url = %request.url, error = %e, "request failed");
            e
        })?;
        let elapsed = started.elapsed();

        tracing::debug!(
            status = raw.status,
            elapsed_ms = elapsed.as_millis() as u64,
            url = %request.url,
            "received response"
        );
        Ok(Response::from_http(raw, elapsed))
    }

    /// String-method entry point. The method is checked before anything is
    /// built, so an unsupported one never reaches the network.
    pub fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Map<String, Value>>,
        options: RequestOptions,
    ) -> Result<Response> {
        let method: HttpMethod = method.parse()?;
        let descriptor = RequestDescriptor {
            method,
            path: path.to_string(),
            body,
            headers: options.headers,
            encrypt: options.encrypt,
        };
        self.execute(&descriptor)
    }

    // An empty body is sent as `{}` even when encryption is requested.
    fn encode_body(&self, body: &Map<String, Value>, encrypt: bool) -> Result<String> {
        if !encrypt || body.is_empty() {
            return Ok(serde_json::to_string(body)?);
        }
        let codec = self.codec.as_ref().ok_or_else(|| {
            HarnessError::Config("encryption requested but no secret key is configured".to_string())
        })?;
        Ok(serde_json::to_string(&codec.seal(body)?)?)
    }
}
