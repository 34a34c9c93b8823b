use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 0.0.0.0 | bind address |
/// | HTTP_PORT | 3000 | bind port |
/// | DATABASE_URL | sqlite://gtd.db?mode=rwc | sqlx connection string, empty disables the database |
/// | UPLOAD_DIR | ./uploads | storage for accepted uploads |
/// | MAX_UPLOAD_BYTES | 10485760 | upload size ceiling |
/// | ROLE_TABLE_PATH | unset | JSON role table replacing the built-in one |
/// | SESSION_COOKIE_NAME | gtd_session | session cookie name |
/// | COOKIE_SECURE | true in production | `Secure` cookie attribute |
/// | ENVIRONMENT | development | development / production |
/// | LOG_LEVEL, LOG_JSON, LOG_DIR | info, false, unset | logging |
/// | BOOTSTRAP_ADMIN_EMAIL / _PASSWORD | unset | seed an admin on an empty database |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// Empty string = no database configured
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub role_table_path: Option<PathBuf>,
    pub session_cookie_name: String,
    pub cookie_secure: bool,
    pub jwt: JwtConfig,
    /// development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://gtd.db?mode=rwc".into()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".into())
                .into(),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            role_table_path: env_opt("ROLE_TABLE_PATH").map(PathBuf::from),
            session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "gtd_session".into()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(environment == "production"),
            jwt,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: env_opt("LOG_DIR").map(PathBuf::from),
            bootstrap_admin_email: env_opt("BOOTSTRAP_ADMIN_EMAIL"),
            bootstrap_admin_password: env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
            environment,
        })
    }

    /// Configuration for tests and embedded use: no database file, fixed JWT key
    pub fn for_testing(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            http_host: "127.0.0.1".into(),
            http_port: 0,
            database_url: String::new(),
            upload_dir: upload_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            role_table_path: None,
            session_cookie_name: "gtd_session".into(),
            cookie_secure: false,
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-32".into(),
                expiration_minutes: 60,
                issuer: "gtd-server".into(),
                audience: "gtd-web".into(),
            },
            environment: "development".into(),
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config() {
        let config = Config::for_testing("/tmp/uploads");
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.jwt.secret.len() >= 32);
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }
}
