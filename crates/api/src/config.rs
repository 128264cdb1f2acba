//! Catalog API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 3000)
//! - `CATALOG_BASE_URL` - Public URL advertised in the API docs (default: `http://{host}:{port}`)
//! - `CATALOG_UPLOAD_DIR` - Directory uploaded images are written to (default: public/uploads)
//! - `CATALOG_CORS_ORIGINS` - Comma-separated allowed origins (default: any origin)
//! - `CATALOG_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog API configuration.
///
/// `Debug` never prints the database URL; `SecretString` redacts it.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without a trailing slash
    pub base_url: String,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl CatalogConfig {
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

    /// Build configuration from any key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.database_url("CATALOG_DATABASE_URL")?;
        let host = env
            .or_default("CATALOG_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("CATALOG_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_PORT".to_string(), e.to_string()))?;
        let base_url = match env.optional("CATALOG_BASE_URL") {
            Some(value) => parse_base_url("CATALOG_BASE_URL", &value)?,
            None => format!("http://{}", SocketAddr::new(host, port)),
        };
        let upload_dir = PathBuf::from(env.or_default("CATALOG_UPLOAD_DIR", "public/uploads"));
        let cors_origins = env
            .optional("CATALOG_CORS_ORIGINS")
            .map(|value| parse_origins("CATALOG_CORS_ORIGINS", &value))
            .transpose()?
            .unwrap_or_default();
        let log_json = env
            .optional("CATALOG_LOG_JSON")
            .is_some_and(|value| matches!(value.trim(), "1" | "true" | "TRUE" | "yes"));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            upload_dir,
            cors_origins,
            log_json,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn parse_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parse a comma-separated origin list into `scheme://host[:port]` strings.
fn parse_origins(key: &str, value: &str) -> Result<Vec<String>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            Url::parse(origin)
                .map(|url| url.origin().ascii_serialization())
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("{origin}: {e}")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CatalogConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CatalogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CATALOG_DATABASE_URL", "postgres://localhost/catalog")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.upload_dir, PathBuf::from("public/uploads"));
        assert!(config.cors_origins.is_empty());
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let result = load(&[]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "CATALOG_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");

        let config = load(&[
            ("CATALOG_DATABASE_URL", "postgres://primary/db"),
            ("DATABASE_URL", "postgres://fallback/db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://primary/db");
    }

    #[test]
    fn test_invalid_port() {
        let result = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_PORT", "http"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "CATALOG_PORT"));
    }

    #[test]
    fn test_base_url_is_validated_and_trimmed() {
        let config = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_BASE_URL", "https://api.shop.example/"),
        ])
        .unwrap();
        assert_eq!(config.base_url, "https://api.shop.example");

        let result = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_BASE_URL", "ftp://files.example"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cors_origins() {
        let config = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            (
                "CATALOG_CORS_ORIGINS",
                "https://shop.example, http://localhost:5173/ ,",
            ),
        ])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://shop.example", "http://localhost:5173"]
        );

        let result = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_CORS_ORIGINS", "not a url"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_json_flag() {
        let config = load(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_LOG_JSON", "true"),
        ])
        .unwrap();
        assert!(config.log_json);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("CATALOG_DATABASE_URL", "postgres://user:hunter2@db/catalog")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
