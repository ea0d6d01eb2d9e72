//! In-memory `Transport` for unit tests.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::http::{HeaderSet, HttpRequest, HttpResponse};
use crate::transport::Transport;

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// Records every request it is asked to send and answers via a closure.
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    respond: Responder,
}

impl RecordingTransport {
    pub(crate) fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    /// Answers every request with `status` and `body`.
    pub(crate) fn ok(status: u16, body: &str) -> Arc<Self> {
        let body = body.to_string();
        Self::new(move |_| {
            Ok(HttpResponse {
                status,
                headers: HeaderSet::new(),
                body: body.clone(),
            })
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}
