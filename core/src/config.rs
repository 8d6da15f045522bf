//! Service layer connection settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::TlsOptions;

/// Where the service layer lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLayerConfig {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub version: u8,
    pub tls: TlsOptions,
}

impl Default for ServiceLayerConfig {
    fn default() -> Self {
        Self {
            https: true,
            host: "localhost".to_string(),
            port: 50000,
            version: 1,
            tls: TlsOptions::default(),
        }
    }
}

impl ServiceLayerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// `http[s]://host:port/b1s/v<version>/`, always with a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}:{}/b1s/v{}/", self.host, self.port, self.version)
    }

    /// Load from `SERVICE_LAYER_HOST` (required), `SERVICE_LAYER_PORT`,
    /// `SERVICE_LAYER_HTTPS` and `SERVICE_LAYER_VERSION`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host = lookup("SERVICE_LAYER_HOST")
            .ok_or_else(|| Error::Config("SERVICE_LAYER_HOST is not set".to_string()))?;
        let mut config = Self::new(host);
        if let Some(port) = lookup("SERVICE_LAYER_PORT") {
            config.port = parse_var("SERVICE_LAYER_PORT", &port)?;
        }
        if let Some(https) = lookup("SERVICE_LAYER_HTTPS") {
            config.https = parse_var("SERVICE_LAYER_HTTPS", &https)?;
        }
        if let Some(version) = lookup("SERVICE_LAYER_VERSION") {
            config.version = parse_var("SERVICE_LAYER_VERSION", &version)?;
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value {value:?}")))
}
