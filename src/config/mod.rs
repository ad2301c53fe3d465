use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
    pub webhook_secret: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://spotter.db")?
            .set_default("database.max_connections", 10)?
            .set_default("identity.base_url", "https://identity.example.com")?
            .set_default("identity.api_key", "")?
            .set_default("identity.webhook_secret", "")?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with SPOTTER__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("SPOTTER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://spotter.db".to_string(),
                max_connections: 10,
            },
            identity: IdentityConfig {
                base_url: "https://identity.example.com".to_string(),
                api_key: String::new(),
                webhook_secret: String::new(),
            },
        }
    }
}
