//! Request configuration and serialization.
//!
//! # Design
//! `RequestBuilder` is a plain value: every setter consumes it and hands it
//! back, so a configured builder can be cloned and reused without any state
//! leaking between calls. `build` is the only step that does I/O (reading
//! attachments) and produces the wire-ready `HttpRequest`.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::cookies::CookieJar;
use crate::error::Error;
use crate::http::{HttpRequest, TlsOptions};
use crate::multipart;
use crate::response::Response;
use crate::transport::Transport;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Accumulates everything needed to produce one `HttpRequest`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    method: String,
    tls: TlsOptions,
    payload: serde_json::Value,
    files: Vec<PathBuf>,
    cookies: CookieJar,
    headers: IndexMap<String, String>,
}

impl RequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            tls: TlsOptions::default(),
            payload: serde_json::Value::Null,
            files: Vec::new(),
            cookies: CookieJar::new(),
            headers: IndexMap::new(),
        }
    }

    /// Set the HTTP verb. Any string is accepted.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls;
        self
    }

    /// Set the JSON payload. `Value::Null` means no body.
    ///
    /// Ignored when files are attached.
    pub fn body(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set the JSON payload from any serializable value.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, Error> {
        let payload = serde_json::to_value(payload).map_err(Error::Serialization)?;
        Ok(self.body(payload))
    }

    /// Attach files to upload as `multipart/form-data`. A non-empty list takes
    /// precedence over the JSON payload.
    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the outbound cookies.
    pub fn cookies(mut self, cookies: impl Into<CookieJar>) -> Self {
        self.cookies = cookies.into();
        self
    }

    /// Replace the outbound headers.
    pub fn headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Serialize the body and headers into a wire-ready request.
    ///
    /// Reads every attachment from disk; an unreadable path fails the build.
    pub fn build(self) -> Result<HttpRequest, Error> {
        let mut headers = self.headers;

        let (content_type, body) = if self.files.is_empty() {
            let body = if self.payload.is_null() {
                Vec::new()
            } else {
                serde_json::to_vec(&self.payload).map_err(Error::Serialization)?
            };
            (JSON_CONTENT_TYPE.to_string(), body)
        } else {
            (multipart::content_type(), multipart::encode_files(&self.files)?)
        };

        set_header(&mut headers, "Content-Type", content_type);
        set_header(&mut headers, "Content-Length", body.len().to_string());
        if !self.cookies.is_empty() {
            set_header(&mut headers, "Cookie", self.cookies.header_value());
        }

        log::debug!(
            "built {} {} ({} header(s), {} body byte(s))",
            self.method,
            self.url,
            headers.len(),
            body.len()
        );

        Ok(HttpRequest {
            url: self.url,
            method: self.method,
            headers,
            body,
            tls: self.tls,
        })
    }

    /// Build the request, run it through `transport` and parse the result.
    pub fn send<T: Transport + ?Sized>(self, transport: &T) -> Result<Response, Error> {
        let request = self.build()?;
        let raw = transport.execute(&request).map_err(Error::Transport)?;
        Ok(Response::from_raw(raw)?)
    }
}

/// Insert `name`, dropping every existing header that differs only in case.
///
/// The new header takes the position of the first one dropped.
fn set_header(headers: &mut IndexMap<String, String>, name: &str, value: String) {
    let positions: Vec<usize> = headers
        .keys()
        .enumerate()
        .filter(|(_, key)| key.eq_ignore_ascii_case(name))
        .map(|(index, _)| index)
        .collect();
    for &index in positions.iter().rev() {
        headers.shift_remove_index(index);
    }
    match positions.first() {
        Some(&index) => {
            headers.shift_insert(index, name.to_string(), value);
        }
        None => {
            headers.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::BOUNDARY;
    use serde_json::json;

    const URL: &str = "https://erp.local:50000/b1s/v1/Items";

    fn header_map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_to_get_with_empty_json_body() {
        let req = RequestBuilder::new(URL).build().unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, URL);
        assert!(req.body.is_empty());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Content-Length"), Some("0"));
        assert!(req.header("Cookie").is_none());
    }

    #[test]
    fn method_is_not_validated() {
        let req = RequestBuilder::new(URL).method("PATCH-ISH").build().unwrap();
        assert_eq!(req.method, "PATCH-ISH");
    }

    #[test]
    fn json_body_sets_length_and_type() {
        let req = RequestBuilder::new(URL)
            .method("POST")
            .body(json!({"ItemCode": "A001", "ItemName": "Äpfel"}))
            .build()
            .unwrap();
        let expected = serde_json::to_vec(&json!({"ItemCode": "A001", "ItemName": "Äpfel"})).unwrap();
        assert_eq!(req.body, expected);
        assert_eq!(req.header("Content-Length"), Some(expected.len().to_string().as_str()));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn null_payload_means_no_body() {
        let req = RequestBuilder::new(URL).body(serde_json::Value::Null).build().unwrap();
        assert!(req.body.is_empty());
        assert_eq!(req.header("Content-Length"), Some("0"));
    }

    #[test]
    fn json_helper_serializes_structs() {
        #[derive(Serialize)]
        struct Payload {
            k: u32,
        }
        let req = RequestBuilder::new(URL).json(&Payload { k: 1 }).unwrap().build().unwrap();
        assert_eq!(req.body, br#"{"k":1}"#);
    }

    #[test]
    fn generated_headers_follow_caller_headers() {
        let req = RequestBuilder::new(URL)
            .headers(header_map(&[("Prefer", "odata.maxpagesize=0"), ("B1S-CaseInsensitive", "true")]))
            .cookies(CookieJar::from_iter([("B1SESSION", "abc")]))
            .build()
            .unwrap();
        assert_eq!(
            req.header_block(),
            "Prefer: odata.maxpagesize=0\r\n\
             B1S-CaseInsensitive: true\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 0\r\n\
             Cookie: B1SESSION=abc;\r\n"
        );
    }

    #[test]
    fn caller_content_type_is_replaced_in_place() {
        let req = RequestBuilder::new(URL)
            .headers(header_map(&[("content-type", "text/plain"), ("Accept", "*/*")]))
            .build()
            .unwrap();
        let content_types: Vec<_> = req
            .headers
            .keys()
            .filter(|key| key.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types, ["Content-Type"]);
        assert_eq!(req.headers.get_index(0).map(|(k, _)| k.as_str()), Some("Content-Type"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn every_case_variant_of_a_generated_header_is_replaced() {
        let req = RequestBuilder::new(URL)
            .headers(header_map(&[
                ("Accept", "*/*"),
                ("content-type", "text/plain"),
                ("CONTENT-TYPE", "text/xml"),
                ("content-length", "99"),
                ("Content-LENGTH", "7"),
            ]))
            .build()
            .unwrap();
        assert_eq!(
            req.header_block(),
            "Accept: */*\r\nContent-Type: application/json\r\nContent-Length: 0\r\n"
        );
    }

    #[test]
    fn cookies_override_caller_cookie_header() {
        let req = RequestBuilder::new(URL)
            .headers(header_map(&[("Cookie", "stale=1")]))
            .cookies(CookieJar::from_iter([("a", "1"), ("b", "x y")]))
            .build()
            .unwrap();
        assert_eq!(req.header("Cookie"), Some("a=1;b=x y;"));
    }

    #[test]
    fn files_override_json_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"line").unwrap();

        let req = RequestBuilder::new(URL)
            .method("POST")
            .body(json!({"ignored": true}))
            .files([&path])
            .build()
            .unwrap();

        let body = String::from_utf8(req.body.clone()).unwrap();
        assert!(!body.contains("ignored"));
        assert!(body.contains("filename=\"notes.txt\""));
        assert!(body.ends_with(&format!("--{BOUNDARY}--")));
        assert_eq!(
            req.header("Content-Type"),
            Some(format!("multipart/form-data; boundary={BOUNDARY}").as_str())
        );
        assert_eq!(req.header("Content-Length"), Some(req.body.len().to_string().as_str()));
    }

    #[test]
    fn unreadable_file_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let err = RequestBuilder::new(URL)
            .files([dir.path().join("nope.bin")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Attachment { .. }));
    }

    #[test]
    fn tls_options_pass_through() {
        let tls = TlsOptions {
            verify_peer: false,
            timeout_secs: Some(30),
            ..TlsOptions::default()
        };
        let req = RequestBuilder::new(URL).tls(tls.clone()).build().unwrap();
        assert_eq!(req.tls, tls);
    }

    #[test]
    fn builder_can_be_reused_by_cloning() {
        let base = RequestBuilder::new(URL).method("POST");
        let first = base.clone().body(json!({"n": 1})).build().unwrap();
        let second = base.build().unwrap();
        assert_eq!(first.body, br#"{"n":1}"#);
        assert!(second.body.is_empty());
    }
}
