//! Request serialization and response parsing for an ERP service layer.
//!
//! # Overview
//! Builds wire-ready `HttpRequest` values (JSON or multipart bodies, cookie
//! and header blocks) and turns the raw status line and header lines a
//! transport returns into a structured `Response`. The network call itself
//! is the caller's job, either directly or through a `Transport`.
//!
//! # Design
//! - `RequestBuilder` is a by-value configuration struct; `build` is the
//!   only step with side effects (reading attachments).
//! - `Response::parse` is a pure function of the lines and body: the status
//!   line is parsed strictly, header lines are folded leniently.
//! - Header and cookie maps preserve insertion order.
//! - `ServiceLayerClient` adds login/logout on top without holding state.

pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod headers;
pub mod http;
pub mod multipart;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

pub use client::ServiceLayerClient;
pub use config::ServiceLayerConfig;
pub use cookies::CookieJar;
pub use error::{Error, ParseError};
pub use headers::{HeaderValue, Headers};
pub use http::{HttpRequest, RawResponse, TlsOptions};
pub use multipart::FileAttachment;
pub use request::RequestBuilder;
pub use response::Response;
pub use transport::{Transport, TransportError};
pub use types::{Credentials, LoginInfo, Session};
