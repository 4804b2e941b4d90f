//! TOML configuration for the broker service, with sectioned sub-structs
//! mirroring the shape of the on-disk file.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub network: NetworkSection,
    pub housekeeper: HousekeeperSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            network: NetworkSection::default(),
            housekeeper: HousekeeperSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub host: String,
    pub port: u16,
}

impl Default for NetworkSection {
    fn default() -> Self {
        NetworkSection {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HousekeeperSection {
    pub interval_secs: u64,
}

impl Default for HousekeeperSection {
    fn default() -> Self {
        HousekeeperSection { interval_secs: 5 }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| ConfigError(format!("parsing {}: {e}", path.display())))
    }

    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, ConfigError> {
        format!("{}:{}", self.network.host, self.network.port)
            .parse()
            .map_err(|e| ConfigError(format!("invalid bind address: {e}")))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec_host_and_port() {
        let config = ServerConfig::default();
        assert_eq!(config.network.host, "0.0.0.0");
        assert_eq!(config.network.port, 8000);
        assert_eq!(config.housekeeper.interval_secs, 5);
    }

    #[test]
    fn loads_partial_toml_with_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\nport = 9100\n").unwrap();
        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.network.port, 9100);
        assert_eq!(config.network.host, "0.0.0.0");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\nbogus = 1\n").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }
}
