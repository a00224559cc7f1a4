//! Runtime settings, read from `settings.toml` in the working directory and
//! overridden by `CONTABLE__`-prefixed environment variables
//! (`CONTABLE__SERVER__PORT=8080`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub database: Database,
}

/// Subjects listed in `viewers` may only issue read requests.
#[derive(Debug, Default, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub viewers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub access: Access,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("CONTABLE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn reads_server_and_viewers() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [server]
                port = 3000
                database = { sqlite = "./contable.db" }

                [access]
                viewers = ["auditor"]
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert!(matches!(settings.server.database, Database::Sqlite(ref p) if p == "./contable.db"));
        assert_eq!(settings.access.viewers, vec!["auditor".to_string()]);
    }

    #[test]
    fn database_defaults_to_memory() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str("[server]\nport = 3000\n", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(matches!(settings.server.database, Database::Memory));
        assert!(settings.access.viewers.is_empty());
    }
}
