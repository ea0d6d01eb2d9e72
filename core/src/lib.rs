//! Blocking HTTP request harness for resource-oriented JSON APIs.
//!
//! # Overview
//! Issues GET/POST/PUT/DELETE calls against a configured base address,
//! optionally encrypting request bodies, and returns normalized responses.
//! A fan-out harness runs batches of independent requests in parallel and
//! collects every outcome before returning.
//!
//! # Design
//! - `HarnessConfig` is built once and shared read-only; there are no globals.
//! - `RequestExecutor::build` produces a plain-data `HttpRequest`;
//!   `execute` sends it through a `Transport` (ureq in production).
//! - HTTP error statuses are data. Only unsupported methods, configuration
//!   problems and transport faults are `Err`.
//! - `CryptoCodec::decode` never fails; bad input becomes an empty mapping.
//! - `FanOut` uses scoped threads and a mutex-guarded `ResultSet`.

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod fanout;
pub mod http;
pub mod response;
pub mod transport;

#[cfg(test)]
mod testing;

pub use codec::{CryptoCodec, EncryptedEnvelope};
pub use config::{HarnessConfig, SecretKey};
pub use descriptor::RequestDescriptor;
pub use error::{DecodeError, HarnessError, Result};
pub use executor::{RequestExecutor, RequestOptions};
pub use fanout::{fan_out, FanOut, ResultSet, WorkerFailure};
pub use http::{HeaderSet, HttpMethod, HttpRequest, HttpResponse};
pub use response::Response;
pub use transport::{Transport, UreqTransport};
