//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub jwt: JwtSettings,
    pub session: SessionSettings,
    pub auth: AuthSettings,
    pub audit: AuditSettings,
    pub upload: UploadSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Directory for rolling JSON log files; stdout only when unset.
    pub log_dir: Option<String>,
    /// CORS origins allowed to call the API.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub validity_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub timeout_seconds: u64,
    /// Age after which a live session is touched again on reuse.
    pub refresh_after_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub staging_dir: String,
}

impl SessionSettings {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn staging_path(&self) -> PathBuf {
        PathBuf::from(&self.staging_dir)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Role granted to every newly registered user.
    pub registration_role: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditSettings {
    pub queue_capacity: usize,
    pub retained_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Load layered configuration: defaults, `config/default`, `config/{APP_ENV}`,
    /// then environment variables (`JWT__SECRET`, `SESSION__TIMEOUT_SECONDS`, ...).
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Built-in defaults only. The JWT secret is left empty and must be set by the caller.
    pub fn with_defaults() -> Result<Self, AppError> {
        Ok(Self::defaults()?.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, AppError> {
        Ok(Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "gerber-server")?
            .set_default("jwt.secret", "")?
            .set_default("jwt.issuer", "gerber-backend")?
            .set_default("jwt.audience", "gerber-frontend")?
            .set_default("jwt.validity_seconds", DEFAULT_TOKEN_VALIDITY_SECONDS)?
            .set_default("session.timeout_seconds", DEFAULT_SESSION_TIMEOUT_SECONDS as i64)?
            .set_default("session.refresh_after_seconds", DEFAULT_SESSION_TIMEOUT_SECONDS as i64)?
            .set_default("session.sweep_interval_seconds", DEFAULT_SWEEP_INTERVAL_SECONDS as i64)?
            .set_default("session.staging_dir", DEFAULT_STAGING_DIR)?
            .set_default("auth.registration_role", DEFAULT_REGISTRATION_ROLE)?
            .set_default("audit.queue_capacity", DEFAULT_AUDIT_QUEUE_CAPACITY as i64)?
            .set_default("audit.retained_entries", DEFAULT_AUDIT_RETAINED_ENTRIES as i64)?
            .set_default("upload.max_body_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.len() < 32 {
            return Err(AppError::InvalidConfig(
                "jwt.secret must be at least 32 bytes".to_string(),
            ));
        }
        if self.jwt.validity_seconds <= 0 {
            return Err(AppError::InvalidConfig(
                "jwt.validity_seconds must be positive".to_string(),
            ));
        }
        if self.session.timeout_seconds == 0 || self.session.sweep_interval_seconds == 0 {
            return Err(AppError::InvalidConfig(
                "session timeout and sweep interval must be non-zero".to_string(),
            ));
        }
        if self.session.refresh_after_seconds > self.session.timeout_seconds {
            return Err(AppError::InvalidConfig(
                "session.refresh_after_seconds cannot exceed session.timeout_seconds".to_string(),
            ));
        }
        Ok(())
    }
}
