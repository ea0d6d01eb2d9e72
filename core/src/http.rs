//! HTTP wire types described as plain data.
//!
//! # Design
//! The executor builds an `HttpRequest` value and hands it to a `Transport`;
//! the transport hands back an `HttpResponse`. Neither type knows about the
//! network, so request building can be asserted on directly in tests.
//!
//! All fields use owned types so values can move freely across worker
//! threads during a fan-out.

use std::fmt;
use std::str::FromStr;

use crate::error::HarnessError;

/// The four supported HTTP methods. Anything else is rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Only POST and PUT carry a request payload.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl FromStr for HttpMethod {
    type Err = HarnessError;

    /// Case-insensitive: `"post"` and `"POST"` are the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(HarnessError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive keys.
///
/// Inserting a name that is already present replaces the old entry in place,
/// keeping the spelling of the newer name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Lay `overrides` on top of `self`; on a name collision the override wins.
    pub fn overlay(mut self, overrides: &HeaderSet) -> HeaderSet {
        for (name, value) in overrides.iter() {
            self.insert(name, value);
        }
        self
    }

    /// Reject names or values that cannot go on the wire.
    pub fn validate(&self) -> Result<(), HarnessError> {
        for (name, value) in self.iter() {
            ureq::http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HarnessError::Config(format!("invalid header name: {name:?}")))?;
            ureq::http::HeaderValue::from_str(value).map_err(|_| {
                HarnessError::Config(format!("invalid value for header {name:?}"))
            })?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderSet::new();
        for (k, v) in iter {
            headers.insert(k.as_ref(), v.as_ref());
        }
        headers
    }
}

/// A fully resolved HTTP request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

/// Raw outcome of one network exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderSet,
    pub body: String,
}
