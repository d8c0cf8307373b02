use std::env;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    /// Load from environment variables (`API_PORT`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("API_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidConfig(format!("API_PORT must be a port number, got '{}'", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        tracing::info!(port, "Loaded server configuration");
        Ok(Self { port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_from_env() {
        env::set_var("API_PORT", "8088");
        assert_eq!(ServerConfig::from_env().unwrap().port, 8088);

        env::set_var("API_PORT", "not-a-port");
        assert!(ServerConfig::from_env().is_err());

        env::remove_var("API_PORT");
        assert_eq!(ServerConfig::from_env().unwrap(), ServerConfig::default());
    }
}
