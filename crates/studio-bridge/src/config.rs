use std::{fmt, path::PathBuf};

use crate::error::{AppError, AppResult};

/// Connection credentials handed to the host by its configuration source.
///
/// The bridge never reads credentials from ambient state; whoever builds the
/// executor passes this value in explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    url: String,
    auth_token: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        let auth_token = auth_token.into();
        if url.trim().is_empty() {
            return Err(AppError::InvalidCredentials("url is empty".into()));
        }
        if auth_token.is_empty() {
            return Err(AppError::InvalidCredentials("auth token is empty".into()));
        }
        Ok(Self { url, auth_token })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}

// Keep the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Where a local executor should open its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Memory,
    File(PathBuf),
}

impl DbTarget {
    pub fn from_url(url: &str) -> AppResult<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("file://")
            .or_else(|| url.strip_prefix("file:"))
            .or_else(|| url.strip_prefix("sqlite://"))
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if rest == ":memory:" {
            return Ok(DbTarget::Memory);
        }
        if rest.contains("://") {
            return Err(AppError::InvalidCredentials(format!(
                "unsupported database url scheme: {url}"
            )));
        }
        // Query parameters (e.g. `?mode=rwc`) are not interpreted.
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() {
            return Err(AppError::InvalidCredentials("database path is empty".into()));
        }
        Ok(DbTarget::File(PathBuf::from(path)))
    }
}
