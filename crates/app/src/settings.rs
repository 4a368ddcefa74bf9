//! Handles settings for the application. Configuration is read from a TOML
//! file (`settings.toml` unless overridden) and from `MATCHLESS__*`
//! environment variables, e.g. `MATCHLESS__SERVER__PORT=9000`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// Used as `X-<name>-*` alert header prefix.
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.name", "matchless")?
            .set_default("server.port", 8080)?
            .set_default("server.database", "memory")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("MATCHLESS").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::new("does-not-exist").unwrap();
        assert_eq!(settings.app.name, "matchless");
        assert_eq!(settings.server.port, 8080);
        assert!(matches!(settings.server.database, Database::Memory));
    }
}
