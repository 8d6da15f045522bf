//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe what crosses the transport boundary as plain data.
//! `RequestBuilder::build` produces an `HttpRequest` and `Response::parse`
//! consumes a `RawResponse`; the transport in between is the caller's
//! business. Nothing here touches the network.
//!
//! All fields use owned types so values can be handed to any transport
//! without lifetime concerns.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Transport options passed through the core unmodified.
///
/// The builder never reads these; they only travel with the `HttpRequest`
/// so the transport can apply them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsOptions {
    pub verify_peer: bool,
    pub verify_peer_name: bool,
    pub allow_self_signed: bool,
    pub cafile: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify_peer: true,
            verify_peer_name: true,
            allow_self_signed: false,
            cafile: None,
            timeout_secs: None,
        }
    }
}

/// A wire-ready HTTP request.
///
/// Built by `RequestBuilder::build`. `headers` keeps insertion order, which is
/// the order of the serialized header block. `Content-Length` always matches
/// `body.len()` and `Content-Type` is present exactly once.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
    pub tls: TlsOptions,
}

impl HttpRequest {
    /// Render the headers as `Name: Value\r\n` lines in map order.
    pub fn header_block(&self) -> String {
        let mut block = String::new();
        for (name, value) in &self.headers {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a transport hands back: the raw status line followed by the raw
/// `Name: Value` header lines, plus the body bytes.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub lines: Vec<String>,
    pub body: Vec<u8>,
}
