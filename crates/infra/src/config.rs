//! Store connection configuration.
//!
//! The hosted store is addressed by its project URL (the PostgREST API lives
//! under `/rest/v1/`) plus the project's anon API key. A direct Postgres URL
//! is optional and selects the sqlx backend instead.

use std::time::Duration;

use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Store connection settings.
///
/// Custom `Debug` redacts the API key and the database URL (which usually
/// embeds a password).
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`.
    pub rest_url: Url,
    /// Sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `postgres://` URL for the direct backend.
    pub database_url: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("rest_url", &self.rest_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SUPABASE_URL` (required)
    /// - `SUPABASE_ANON_KEY` (required)
    /// - `PROCURE_TIMEOUT_SECS` (default: 30)
    /// - `DATABASE_URL` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let raw_url = non_blank("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let rest_url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::InvalidUrl("SUPABASE_URL".to_string(), e.to_string()))?;
        if rest_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(
                "SUPABASE_URL".to_string(),
                "not a base URL".to_string(),
            ));
        }

        let api_key = non_blank("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let timeout_secs = match non_blank("PROCURE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("PROCURE_TIMEOUT_SECS", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            rest_url,
            api_key: api_key.trim().to_string(),
            timeout_secs,
            database_url: non_blank("DATABASE_URL"),
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local(rest_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            rest_url: Url::parse(rest_url)
                .map_err(|e| ConfigError::InvalidUrl(rest_url.to_string(), e.to_string()))?,
            api_key: api_key.to_string(),
            timeout_secs: 5,
            database_url: None,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("{0} must be a whole number of seconds, got {1:?}")]
    InvalidNumber(&'static str, String),
}
