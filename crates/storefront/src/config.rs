//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOOKSTORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BOOKSTORE_BASE_URL` - Public URL for the storefront, used for the sitemap and cookies
//!
//! ## Optional
//! - `BOOKSTORE_HOST` - Bind address (default: 127.0.0.1)
//! - `BOOKSTORE_PORT` - Listen port (default: 5000)
//! - `BOOKSTORE_TRUST_PROXY_HEADERS` - `true` when a reverse proxy sets
//!   `X-Forwarded-For`; login rate limiting then keys on it (default: false)
//! - `BOOKSTORE_STATIC_DIR` - Directory served under `/static` (default: the
//!   crate's `static/` directory)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: production)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Static assets shipped with the crate.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Whether client IPs may be read from proxy headers
    pub trust_proxy_headers: bool,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Error tracking
    pub sentry: SentryConfig,
}

/// Sentry settings. Tracking is off when `dsn` is unset.
#[derive(Clone)]
pub struct SentryConfig {
    pub dsn: Option<SecretString>,
    pub environment: String,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: "production".to_string(),
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = env("BOOKSTORE_DATABASE_URL")
            .or_else(|| env("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("BOOKSTORE_DATABASE_URL".to_string()))?;

        let host = parse_var(&env, "BOOKSTORE_HOST", "127.0.0.1")?;
        let port = parse_var(&env, "BOOKSTORE_PORT", "5000")?;

        let base_url = env("BOOKSTORE_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("BOOKSTORE_BASE_URL".to_string()))?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BOOKSTORE_BASE_URL".to_string(), e.to_string())
        })?;

        let trust_proxy_headers = parse_var(&env, "BOOKSTORE_TRUST_PROXY_HEADERS", "false")?;
        let static_dir = env("BOOKSTORE_STATIC_DIR")
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        let sentry = SentryConfig {
            dsn: env("SENTRY_DSN")
                .filter(|dsn| !dsn.is_empty())
                .map(SecretString::from),
            environment: env("SENTRY_ENVIRONMENT").unwrap_or_else(|| "production".to_string()),
            sample_rate: parse_rate(&env, "SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate(&env, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            trust_proxy_headers,
            static_dir,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        self.base_url
            .join(path)
            .map_or_else(|_| format!("{}{path}", self.base_url), String::from)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_var<T>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_rate(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<f32, ConfigError> {
    let rate: f32 = parse_var(env, key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("BOOKSTORE_DATABASE_URL", "postgres://localhost/bookstore"),
        ("BOOKSTORE_BASE_URL", "http://localhost:5000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert!(!config.secure_cookies());
        assert!(config.sentry.dsn.is_none());
        assert_eq!(config.sentry.environment, "production");
        assert!(!config.trust_proxy_headers);
        assert!(config.static_dir.join("css/main.css").is_file());
    }

    #[test]
    fn test_proxy_and_static_overrides() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("BOOKSTORE_TRUST_PROXY_HEADERS", "true"));
        vars.push(("BOOKSTORE_STATIC_DIR", "/srv/bookstore/static"));
        let config = load(&vars).unwrap();
        assert!(config.trust_proxy_headers);
        assert_eq!(config.static_dir, PathBuf::from("/srv/bookstore/static"));

        let mut vars = MINIMAL.to_vec();
        vars.push(("BOOKSTORE_TRUST_PROXY_HEADERS", "sometimes"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fallback/db"),
            ("BOOKSTORE_BASE_URL", "https://books.example.com"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("BOOKSTORE_BASE_URL", "http://localhost:5000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BOOKSTORE_DATABASE_URL"));

        let err = load(&[("BOOKSTORE_DATABASE_URL", "postgres://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BOOKSTORE_BASE_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("BOOKSTORE_PORT", "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let mut vars = MINIMAL.to_vec();
        vars.push(("SENTRY_SAMPLE_RATE", "1.5"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let vars = [
            ("BOOKSTORE_DATABASE_URL", "postgres://x"),
            ("BOOKSTORE_BASE_URL", "not a url"),
        ];
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));
    }

    #[test]
    fn test_absolute_url() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.absolute_url("/books"), "http://localhost:5000/books");
    }

    #[test]
    fn test_sentry_debug_redacts_dsn() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SENTRY_DSN", "https://super_secret_key@o0.ingest.sentry.io/1"));
        let config = load(&vars).unwrap();

        let debug_output = format!("{:?}", config.sentry);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }
}
