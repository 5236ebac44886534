//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory and from `FINLY__`-prefixed
//! environment variables (e.g. `FINLY__APP__LEVEL=debug`).
//!
//! See `settings.example.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the `finly` and `ledger` targets.
    pub level: String,
    /// IANA timezone used to evaluate "today", "this week", ...
    pub timezone: String,
    /// Starting balance entered at onboarding, as a decimal string.
    pub initial_balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub default_pin: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.timezone", "UTC")?
            .set_default("app.initial_balance", "0")?
            .set_default("database", "memory")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("FINLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
