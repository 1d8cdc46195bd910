//! Request signing for the TM3 API.
//!
//! Every authenticated request carries a `TM-HMAC-SHA256` authorization
//! header: an HMAC-SHA256 over `key + shortname + timestamp`, keyed by the
//! API secret, rendered as hex. The timestamp has second precision, so the
//! header is recomputed for every request rather than cached.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme name sent in the header.
pub const AUTH_SCHEME: &str = "TM-HMAC-SHA256";

/// Credentials for one TM3 account.
///
/// Immutable for the duration of a request; clone freely.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account shortname. `None` selects the default "no tenant" mode, in
    /// which URL resolution substitutes the `_` sentinel.
    pub shortname: Option<String>,
    /// API key, included verbatim in the authorization header.
    pub key: String,
    /// API secret, used as the HMAC key and never sent over the wire.
    pub secret: String,
}

impl Credentials {
    pub fn new(
        shortname: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            shortname: Some(shortname.into()),
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Credentials for the default "no tenant" mode.
    pub fn without_shortname(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            shortname: None,
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Read `TM3_SHORTNAME` / `TM3_API_KEY` / `TM3_API_SECRET` from the
    /// environment. The shortname is optional, key and secret are not.
    pub fn from_env() -> Result<Self, ApiError> {
        let key = std::env::var("TM3_API_KEY")
            .map_err(|_| ApiError::Config("TM3_API_KEY is not set".into()))?;
        let secret = std::env::var("TM3_API_SECRET")
            .map_err(|_| ApiError::Config("TM3_API_SECRET is not set".into()))?;
        Ok(Self {
            shortname: std::env::var("TM3_SHORTNAME").ok(),
            key,
            secret,
        })
    }

    /// Shortname substituted into URL templates, `_` when absent.
    pub(crate) fn shortname_or_default(&self) -> &str {
        self.shortname.as_deref().unwrap_or("_")
    }
}

/// Authorization header value for `credentials` at the current time.
pub fn authorization_header(credentials: &Credentials) -> String {
    authorization_header_at(credentials, Utc::now())
}

/// Authorization header value at a pinned instant.
///
/// Signing is deterministic given identical inputs within the same second;
/// this variant exists so callers and tests can verify that.
pub fn authorization_header_at(credentials: &Credentials, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y-%m-%dT%H:%M:%S").to_string();
    let shortname = credentials.shortname.as_deref().unwrap_or("");
    let payload = format!("{}{}{}", credentials.key, shortname, timestamp);

    let mut mac = HmacSha256::new_from_slice(credentials.secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!(
        "{AUTH_SCHEME} key={} ts={} sign={}",
        credentials.key, timestamp, signature
    )
}
