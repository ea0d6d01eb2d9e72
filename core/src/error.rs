//! Error types for the request harness.
//!
//! # Design
//! Only two kinds of failure ever reach a caller of `execute`: programmer or
//! configuration mistakes (an unsupported method, a missing key) and
//! transport faults. A 4xx/5xx status is not an error here; it comes back as
//! an ordinary `Response` for the caller to inspect.
//!
//! `DecodeError` is the internal diagnostic for the crypto codec. It is
//! collapsed into an empty mapping at the public `decode` boundary.

use thiserror::Error;

/// Errors returned by the executor and fan-out harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The method is not one of GET, POST, PUT, DELETE. Never retriable.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The network exchange itself failed (refused, timed out, DNS, ...).
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarnessError {
    /// True for network-level faults, as opposed to configuration mistakes.
    pub fn is_transport(&self) -> bool {
        matches!(self, HarnessError::Transport { .. })
    }

    pub(crate) fn transport(url: &str, message: impl std::fmt::Display) -> Self {
        HarnessError::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}

/// Why a ciphertext could not be turned back into a mapping.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    Length(usize),

    #[error("invalid padding byte {0}")]
    Padding(u8),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decrypted JSON is not an object")]
    NotAnObject,
}

pub type Result<T> = std::result::Result<T, HarnessError>;
