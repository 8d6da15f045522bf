//! Stateless request factory and login handling for the service layer.
//!
//! # Design
//! `ServiceLayerClient` holds only its `ServiceLayerConfig` and carries no
//! mutable state between calls. Operations are split into `build_*` methods
//! that return a configured `RequestBuilder` and `parse_*` methods that
//! consume a `Response`. The caller runs the exchange in between, either by
//! hand or through `RequestBuilder::send`.

use crate::config::ServiceLayerConfig;
use crate::cookies::CookieJar;
use crate::error::Error;
use crate::request::RequestBuilder;
use crate::response::Response;
use crate::types::{Credentials, LoginInfo, Session};

#[derive(Debug, Clone)]
pub struct ServiceLayerClient {
    config: ServiceLayerConfig,
}

impl ServiceLayerClient {
    pub fn new(config: ServiceLayerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceLayerConfig {
        &self.config
    }

    /// A `GET` builder for `path` relative to the service layer root, carrying
    /// the configured TLS options.
    pub fn request(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url(), path.trim_start_matches('/'));
        RequestBuilder::new(url).tls(self.config.tls.clone())
    }

    /// Like `request`, with the session cookies attached.
    pub fn session_request(&self, session: &Session, path: &str) -> RequestBuilder {
        self.request(path).cookies(session.cookies.clone())
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<RequestBuilder, Error> {
        self.request("Login").method("POST").json(credentials)
    }

    /// Turn a login response into a `Session` holding every cookie the
    /// service layer set.
    pub fn parse_login(&self, response: Response) -> Result<Session, Error> {
        check_status(&response, 200)?;
        let info: LoginInfo = response.json()?;
        let cookies: CookieJar = response
            .cookies()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        log::debug!("logged in, session {} with {} cookie(s)", info.session_id, cookies.len());
        Ok(Session { info, cookies })
    }

    pub fn build_logout(&self, session: &Session) -> RequestBuilder {
        self.session_request(session, "Logout").method("POST")
    }

    pub fn parse_logout(&self, response: Response) -> Result<(), Error> {
        check_status(&response, 204)
    }
}

/// Map an unexpected status code to `Error::Http`.
fn check_status(response: &Response, expected: u16) -> Result<(), Error> {
    if response.status_code() == expected {
        return Ok(());
    }
    Err(Error::Http {
        status: response.status_code(),
        body: response.text(),
    })
}
