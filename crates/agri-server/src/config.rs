//! Server configuration.
//!
//! Sources, later overriding earlier:
//! 1. `agribridge.yaml` in the working directory (optional)
//! 2. The file passed to [`AppConfig::load`], if any
//! 3. The file named by `AGRIBRIDGE_CONFIG`, if set
//! 4. `AGRIBRIDGE__<SECTION>__<KEY>` environment variables

use agri_auth::AuthConfig;
use agri_db::DbConfig;
use agri_integrations::{LineConfig, PaymentKeys};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "AGRIBRIDGE_CONFIG";
pub const CONFIG_ENV_PREFIX: &str = "AGRIBRIDGE";
const DEFAULT_CONFIG_FILE: &str = "agribridge";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS. Credentials are allowed, so
    /// wildcards are not accepted.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".into(),
                "http://127.0.0.1:5173".into(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub payments: PaymentKeys,
    pub line: LineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub integrations: IntegrationsConfig,
    /// Provision the default tenant and demo telemetry on startup.
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            integrations: IntegrationsConfig::default(),
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }
        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::Invalid(
                "server.cors_origins must list explicit origins".into(),
            ));
        }
        Ok(())
    }

    /// Settings that still carry development placeholders.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.auth.uses_default_secret() {
            warnings.push("JWT secret is still the built-in development default".to_string());
        }
        for method in self.integrations.payments.simulated_methods() {
            warnings.push(format!(
                "{method} API key is missing or a mock key; payments are simulated"
            ));
        }
        if !self.integrations.line.is_configured() {
            warnings.push("LINE channel credentials are not configured".to_string());
        }
        warnings
    }
}
