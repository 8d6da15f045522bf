//! Service layer login DTOs.
//!
//! Field names follow the service layer's PascalCase JSON.

use serde::{Deserialize, Serialize};

use crate::cookies::CookieJar;

/// Body of a `Login` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    #[serde(rename = "CompanyDB")]
    pub company_db: String,
    pub user_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<u32>,
}

/// Body of a successful `Login` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct LoginInfo {
    pub session_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub session_timeout: u32,
}

/// An authenticated session: the login details plus the cookies to send
/// back on every following request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub info: LoginInfo,
    pub cookies: CookieJar,
}
