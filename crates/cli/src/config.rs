//! Configuration loading from warden.toml.

use policy::{Endpoint, Mode, Whitelist};
use serde::Deserialize;
use std::path::Path;

/// Default whitelist: the plant's Modbus PLC, S7 PLC, and historian.
const DEFAULT_WHITELIST: [&str; 3] = ["10.0.0.50:502", "10.0.0.51:102", "192.168.100.10:443"];

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Security mode applied before the run.
    pub mode: Mode,

    /// Approved endpoints as `address:port` strings.
    pub whitelist: Vec<String>,

    /// Driver simulation settings.
    pub driver: DriverConfig,
}

/// Driver simulation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Exfiltration target as `address:port`.
    pub target: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            whitelist: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
            driver: DriverConfig::default(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            target: "1.1.1.1:80".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The parsed whitelist. A malformed entry fails here, at startup,
    /// naming the bad string.
    pub fn whitelist(&self) -> Result<Whitelist, policy::Error> {
        self.whitelist
            .iter()
            .map(|entry| entry.parse::<Endpoint>())
            .collect()
    }

    /// The parsed driver exfiltration target.
    pub fn driver_target(&self) -> Result<Endpoint, policy::Error> {
        self.driver.target.parse()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
mode = "secure-channel"
whitelist = ["10.0.0.50:502"]

[driver]
target = "203.0.113.7:443"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.mode, Mode::SecureChannel);
        assert_eq!(config.whitelist().unwrap().len(), 1);
        assert_eq!(config.driver_target().unwrap().port, 443);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.mode, Mode::DataDiode);
        assert_eq!(config.whitelist().unwrap().len(), 3);
        assert_eq!(config.driver_target().unwrap().to_string(), "1.1.1.1:80");
    }

    #[test]
    fn malformed_whitelist_entry_is_reported() {
        let config = Config::parse("whitelist = [\"not-an-endpoint\"]").unwrap();
        let err = config.whitelist().unwrap_err();
        assert!(err.to_string().contains("not-an-endpoint"));
    }
}
