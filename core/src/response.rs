//! Structured view of a raw transport response.
//!
//! # Design
//! Parsing runs in two phases. The status line is parsed first and any
//! problem with it fails the whole response. The remaining lines are then
//! folded one by one through `HeaderState::fold_line`, a pure reducer that
//! never fails: lines it cannot make sense of are skipped.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::cookies::parse_set_cookie;
use crate::error::{Error, ParseError};
use crate::headers::{HeaderValue, Headers};
use crate::http::RawResponse;

/// A parsed response. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status_code: u16,
    headers: Headers,
    cookies: IndexMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    /// Parse the status line and header lines returned by a transport.
    pub fn parse<S: AsRef<str>>(lines: &[S], body: Vec<u8>) -> Result<Self, ParseError> {
        let (status_line, header_lines) = lines.split_first().ok_or(ParseError::MissingStatusLine)?;
        let status_code = parse_status_line(status_line.as_ref())?;

        let state = header_lines
            .iter()
            .fold(HeaderState::default(), |state, line| state.fold_line(line.as_ref()));

        log::debug!(
            "parsed response {} ({} header(s), {} cookie(s), {} body byte(s))",
            status_code,
            state.headers.len(),
            state.cookies.len(),
            body.len()
        );

        Ok(Self {
            status_code,
            headers: state.headers,
            cookies: state.cookies,
            body,
        })
    }

    pub fn from_raw(raw: RawResponse) -> Result<Self, ParseError> {
        Self::parse(raw.lines.as_slice(), raw.body)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get_ignore_case(name)
    }

    /// The media type without parameters, e.g. `text/html`.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type").and_then(HeaderValue::first)
    }

    pub fn cookies(&self) -> &IndexMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(Error::Deserialization)
    }
}

/// Extract the status code from a line such as `HTTP/1.1 200 OK`.
pub fn parse_status_line(line: &str) -> Result<u16, ParseError> {
    let code = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ParseError::MalformedStatusLine(line.to_string()))?;
    code.parse()
        .map_err(|_| ParseError::InvalidStatusCode(code.to_string()))
}

/// Accumulated headers and cookies while folding header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderState {
    pub headers: Headers,
    pub cookies: IndexMap<String, String>,
}

impl HeaderState {
    /// Fold one raw `Name: Value` line into the state.
    ///
    /// A name already present in `headers` is merged into a list. A first
    /// `Content-Type` keeps only its media type and every `Set-Cookie` goes to
    /// `cookies` instead of `headers`.
    pub fn fold_line(mut self, line: &str) -> Self {
        let Some((name, value)) = line.split_once(':') else {
            log::trace!("skipping header line without separator: {line:?}");
            return self;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            log::trace!("skipping header line without name: {line:?}");
            return self;
        }

        if self.headers.contains(name) {
            self.headers.append(name, value.to_string());
        } else if name.eq_ignore_ascii_case("Content-Type") {
            let media_type = value.split(';').next().unwrap_or("").trim();
            self.headers.append(name, media_type.to_string());
        } else if name.eq_ignore_ascii_case("Set-Cookie") {
            match parse_set_cookie(value) {
                Some((cookie, cookie_value)) => {
                    self.cookies.insert(cookie, cookie_value);
                }
                None => log::trace!("skipping unnamed cookie: {value:?}"),
            }
        } else {
            self.headers.append(name, value.to_string());
        }
        self
    }
}
