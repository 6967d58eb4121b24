//! Server settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a `VETPAL_*` environment
//! variable or a configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Invalid setting value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}='{value}': {reason}")]
pub struct SettingsError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Configuration for the VETPAL backend process.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VETPAL")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps records in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
    /// Accept a generated key when the key file is unreadable. Debug only.
    pub session_allow_ephemeral: Option<bool>,
    /// Hosted checkout page for one-time donations.
    pub checkout_one_time_url: Option<String>,
    /// Hosted checkout page for monthly donations.
    pub checkout_monthly_url: Option<String>,
    /// Stop applications leaving `accepted`, `rejected` or `closed`.
    #[ortho_config(default = false)]
    pub lock_terminal_statuses: bool,
    /// Shared admin token honoured by the `legacy-admin-token` feature.
    pub legacy_admin_token: Option<String>,
}

impl ServerSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// [`SettingsError`] when the configured value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError {
            name: "VETPAL_BIND_ADDR",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Database URL when one is configured and not blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Parsed one-time checkout page.
    ///
    /// # Errors
    ///
    /// [`SettingsError`] when the value is not an absolute URL.
    pub fn checkout_one_time_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("VETPAL_CHECKOUT_ONE_TIME_URL", self.checkout_one_time_url.as_deref())
    }

    /// Parsed monthly checkout page.
    ///
    /// # Errors
    ///
    /// [`SettingsError`] when the value is not an absolute URL.
    pub fn checkout_monthly_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("VETPAL_CHECKOUT_MONTHLY_URL", self.checkout_monthly_url.as_deref())
    }
}

fn parse_url(name: &'static str, raw: Option<&str>) -> Result<Option<Url>, SettingsError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    Url::parse(raw).map(Some).map_err(|err| SettingsError {
        name,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}
