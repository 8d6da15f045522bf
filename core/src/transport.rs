//! The seam between the core and whatever performs the network call.
//!
//! The core never opens a connection. A `Transport` receives the fully
//! formed `HttpRequest` (including its opaque `TlsOptions`) and returns the
//! raw status line, header lines and body. Its failures are passed to the
//! caller untouched.

use crate::http::{HttpRequest, RawResponse};

/// Opaque transport-level failure (DNS, refused connection, TLS, ...).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Executes one request/response exchange.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<RawResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        self(request)
    }
}
