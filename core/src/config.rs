//! Process-wide harness configuration.
//!
//! # Design
//! `HarnessConfig` is built once at startup (directly or from the
//! environment) and handed to the executor behind an `Arc`. Nothing in the
//! crate reads ambient globals after that point; the base address, API key
//! and encryption key are immutable for the life of the process.

use std::fmt;
use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::http::HeaderSet;

pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api/";
pub const DEFAULT_API_KEY: &str = "reqres-free-v1";

pub const ENV_BASE_URL: &str = "HARNESS_BASE_URL";
pub const ENV_API_KEY: &str = "HARNESS_API_KEY";
pub const ENV_SECRET_KEY: &str = "HARNESS_SECRET_KEY";
pub const ENV_TIMEOUT_MS: &str = "HARNESS_TIMEOUT_MS";
pub const ENV_MAX_WORKERS: &str = "HARNESS_MAX_WORKERS";

/// Static symmetric key for the crypto codec: 16, 24 or 32 bytes, selecting
/// AES-128, AES-192 or AES-256.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        match bytes.len() {
            16 | 24 | 32 => Ok(Self(bytes)),
            n => Err(HarnessError::Config(format!(
                "secret key must be 16, 24 or 32 bytes, got {n}"
            ))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Key material stays out of logs.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({} bytes)", self.0.len())
    }
}

/// Everything the executor and codec need to know about their environment.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub api_key: String,
    pub secret_key: Option<SecretKey>,
    /// Global per-request timeout applied by the transport. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Upper bound on fan-out workers. `None` spawns one per descriptor.
    pub max_workers: Option<usize>,
}

impl HarnessConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            secret_key: None,
            timeout: None,
            max_workers: None,
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn with_secret_key(mut self, key: SecretKey) -> Self {
        self.secret_key = Some(key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Zero is treated as one; a fan-out always makes progress.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers.max(1));
        self
    }

    /// Build from `HARNESS_*` environment variables, falling back to the
    /// public reqres endpoint and its free-tier API key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url);

        if let Some(api_key) = lookup(ENV_API_KEY) {
            config.api_key = api_key;
        }
        if let Some(key) = lookup(ENV_SECRET_KEY) {
            config.secret_key = Some(SecretKey::new(key.into_bytes())?);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let millis = parse_number(ENV_TIMEOUT_MS, &raw)?;
            config.timeout = Some(Duration::from_millis(millis as u64));
        }
        if let Some(raw) = lookup(ENV_MAX_WORKERS) {
            match parse_number(ENV_MAX_WORKERS, &raw)? {
                0 => {
                    return Err(HarnessError::Config(format!(
                        "{ENV_MAX_WORKERS} must be at least 1"
                    )))
                }
                n => config.max_workers = Some(n),
            }
        }
        Ok(config)
    }

    /// Join the base address and a relative resource path with exactly one `/`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Headers sent with every request unless a call overrides them.
    pub fn default_headers(&self) -> HeaderSet {
        let mut headers = HeaderSet::new();
        headers.insert("x-api-key", &self.api_key);
        headers.insert("Content-Type", "application/json");
        headers
    }
}

fn parse_number(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| HarnessError::Config(format!("{name} is not a number: {raw:?}")))
}
