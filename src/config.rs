use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables (after `.env`).
///
/// | Env Var                       | Default                 |
/// |-------------------------------|-------------------------|
/// | `DATABASE_URL`                | required                |
/// | `BIND_ADDR`                   | `0.0.0.0:8000`          |
/// | `SESSION_SECRET`              | random per process      |
/// | `MEDIA_DIR`                   | `media`                 |
/// | `CORS_ORIGIN`                 | `http://localhost:3003` |
/// | `RUST_LOG_FORMAT`             | `text`                  |
/// | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset (no export)       |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Signing secret for the session cookie, at least 64 bytes.
    pub session_secret: Option<String>,
    pub media_dir: PathBuf,
    pub cors_origin: String,
    pub log_format: String,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let session_secret = std::env::var("SESSION_SECRET").ok();
        if let Some(secret) = &session_secret {
            if secret.len() < 64 {
                return Err(ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    reason: "must be at least 64 bytes".to_string(),
                });
            }
        }

        Ok(Self {
            database_url,
            bind_addr,
            session_secret,
            media_dir: std::env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "media".to_string())
                .into(),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3003".to_string()),
            log_format: std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        })
    }

    /// Cookie signing key. Falls back to a random key, which invalidates
    /// every session on restart.
    pub fn session_key(&self) -> tower_cookies::Key {
        match &self.session_secret {
            // Length is checked in `from_env`.
            Some(secret) => tower_cookies::Key::from(secret.as_bytes()),
            None => {
                tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
                tower_cookies::Key::generate()
            }
        }
    }
}
