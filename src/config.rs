use crate::schemas::AppState;
use crate::templates::Templates;
use anyhow::{Context, Result};
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://taxi.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: i64 = 30;

/// Runtime settings layered from defaults, `.env` and `TAXI_*` variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    /// Load settings from the environment (after reading `.env`).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::with_prefix("TAXI").try_parsing(true))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Command line values win over everything else.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Connect to the database and build the shared application state.
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", settings.database_url))?;

    let templates = Templates::load().context("Failed to load HTML templates")?;

    Ok(AppState {
        db,
        templates,
        request_timeout: settings.request_timeout(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("TAXI")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_environment(environment(&[])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let settings = Settings::from_environment(environment(&[
            ("TAXI_BIND_ADDRESS", "127.0.0.1:8080"),
            ("TAXI_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_cli_overrides_win() {
        let settings = Settings::from_environment(environment(&[("TAXI_DATABASE_URL", "sqlite::memory:")]))
            .unwrap()
            .with_overrides(Some("sqlite://other.db".to_string()), None);
        assert_eq!(settings.database_url, "sqlite://other.db");
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
    }
}
