//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DRC_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DRC_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DRC_STORAGE__PATH=/var/lib/drc` sets the `storage.path` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use drc::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`, `public_url` - binding, and the base URL used in hyperlinks
//! - **Database**: `database.url`, `database.pool` - PostgreSQL connection settings
//! - **Storage**: `storage.path` - root directory for uploaded document content
//! - **Content**: `content.accept_any_content_type`, `content.stored_extension` - upload policy
//! - **Features**: `enable_metrics`, `enable_otel_export`, `log_format`, `cors`

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DRC_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Externally visible base URL. Resource hyperlinks (`url` fields) are built from it and
    /// incoming hyperlinks are resolved against its path.
    pub public_url: Url,
    /// Set from `DATABASE_URL`; takes precedence over `database.url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
    /// Where document content is written
    pub storage: StorageConfig,
    /// Upload policy for document content
    pub content: ContentPolicy,
    /// Maximum request body size in bytes for document uploads (base64 inflates content by ~4/3)
    pub max_upload_size: usize,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Export traces over OTLP, configured through the standard `OTEL_*` environment variables
    pub enable_otel_export: bool,
}

/// Connection pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// `None` when idle connections are never closed
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// `None` when connections live forever
    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }
}

/// External PostgreSQL database.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/drc".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Local filesystem storage for document content.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory; content lands in `<path>/uploads/<YYYY>/<MM>/`
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("media"),
        }
    }
}

/// Upload policy for `inhoud`.
///
/// By default every content type is accepted and content is stored with the generic `bin`
/// extension, whatever the payload is.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentPolicy {
    /// Accept content of any media type
    pub accept_any_content_type: bool,
    /// Extension given to every stored file
    pub stored_extension: String,
    /// Media types accepted when `accept_any_content_type` is false. Clients must then declare
    /// the media type with a `data:` URI.
    pub allowed_content_types: Vec<String>,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            accept_any_content_type: true,
            stored_extension: "bin".to_string(),
            allowed_content_types: Vec::new(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: Url::parse("http://localhost:8000").expect("static URL is valid"),
            database_url: None,
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            content: ContentPolicy::default(),
            max_upload_size: 100 * 1024 * 1024,
            cors: CorsConfig::default(),
            enable_metrics: false,
            log_format: LogFormat::default(),
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // DATABASE_URL wins over the configured url, pool settings are kept
        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.public_url.scheme(), "http" | "https") || self.public_url.host_str().is_none() {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: public_url must be an absolute http(s) URL, got '{}'",
                    self.public_url
                ),
            });
        }

        let extension = &self.content.stored_extension;
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: content.stored_extension must be a bare extension such as 'bin', got '{extension}'"
                ),
            });
        }

        if !self.content.accept_any_content_type && self.content.allowed_content_types.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: content.accept_any_content_type is false but content.allowed_content_types is empty, \
                     no upload could ever be accepted"
                    .to_string(),
            });
        }

        let pool = &self.database.pool;
        if pool.min_connections > pool.max_connections {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: database.pool.min_connections ({}) cannot be greater than max_connections ({})",
                    pool.min_connections, pool.max_connections
                ),
            });
        }

        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            // DRC_CONFIG names the file itself and is not a config key
            .merge(Env::prefixed("DRC_").ignore(&["CONFIG"]).split("__"))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.content.accept_any_content_type);
        assert_eq!(config.content.stored_extension, "bin");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_yaml_values_are_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
public_url: https://drc.example.com/
storage:
  path: /var/lib/drc
content:
  stored_extension: dat
log_format: json
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 9000);
            assert_eq!(config.public_url.as_str(), "https://drc.example.com/");
            assert_eq!(config.storage.path, PathBuf::from("/var/lib/drc"));
            assert_eq!(config.content.stored_extension, "dat");
            assert!(config.content.accept_any_content_type);
            assert_eq!(config.log_format, LogFormat::Json);

            Ok(())
        });
    }

    #[test]
    fn test_config_path_variable_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "port: 9100\n")?;
            jail.set_env("DRC_CONFIG", "custom.yaml");

            let config = Config::load(&args("custom.yaml"))?;
            assert_eq!(config.port, 9100);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 0.0.0.0
port: 9000
"#,
            )?;

            jail.set_env("DRC_HOST", "127.0.0.1");
            jail.set_env("DRC_PORT", "8080");
            jail.set_env("DRC_STORAGE__PATH", "/tmp/drc-media");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.storage.path, PathBuf::from("/tmp/drc-media"));

            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_overrides_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
database:
  url: postgres://from-yaml/drc
  pool:
    max_connections: 3
"#,
            )?;

            jail.set_env("DATABASE_URL", "postgres://from-env/drc");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.database.url, "postgres://from-env/drc");
            assert!(config.database_url.is_none());
            // pool settings survive the override
            assert_eq!(config.database.pool.max_connections, 3);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "not_a_setting: true\n")?;

            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_invalid_stored_extension() {
        for extension in ["", ".bin", "a/b"] {
            let mut config = Config::default();
            config.content.stored_extension = extension.to_string();
            assert!(config.validate().is_err(), "'{extension}' should be rejected");
        }
    }

    #[test]
    fn test_restricted_content_needs_allowlist() {
        let mut config = Config::default();
        config.content.accept_any_content_type = false;
        assert!(config.validate().is_err());

        config.content.allowed_content_types = vec!["application/pdf".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_public_url_must_be_http() {
        let mut config = Config::default();
        config.public_url = Url::parse("ftp://example.com").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds() {
        let mut config = Config::default();
        config.database.pool.min_connections = 20;
        config.database.pool.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_cors_with_credentials_is_rejected() {
        let mut config = Config::default();
        config.cors.allow_credentials = true;
        assert!(config.validate().is_err());

        config.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://app.example.com").unwrap())];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_timeouts() {
        let settings = PoolSettings {
            idle_timeout_secs: 0,
            max_lifetime_secs: 60,
            ..Default::default()
        };
        assert_eq!(settings.idle_timeout(), None);
        assert_eq!(settings.max_lifetime(), Some(Duration::from_secs(60)));
        assert_eq!(settings.acquire_timeout(), Duration::from_secs(30));
    }
}
