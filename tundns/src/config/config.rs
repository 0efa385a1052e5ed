use crate::config::{ConfigError, FileError};
use crate::dns::{DnsMethod, DnsOverride};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct DnsConfig {
    /// Name of the managed interface.
    pub interface: String,
    #[serde(default)]
    pub dns: Vec<IpAddr>,
    #[serde(default)]
    pub search: Vec<String>,
    #[serde(default)]
    pub method: DnsMethod,
    /// Resolver file used by the `resolv-conf` method.
    #[serde(default)]
    pub resolv_conf: Option<PathBuf>,
}

impl DnsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let name = path.to_string_lossy().to_string();
        let text = fs::read_to_string(path).map_err(|e| FileError::Io(name.clone(), e))?;
        let config = Self::parse(&text).map_err(|e| FileError::Serde(name, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interface.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interface must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .search
            .iter()
            .find(|s| s.is_empty() || s.contains(char::is_whitespace))
        {
            return Err(ConfigError::Invalid(format!(
                "bad search suffix {:?}",
                bad
            )));
        }
        Ok(())
    }

    pub fn overrides(&self) -> DnsOverride {
        DnsOverride::new(self.dns.clone(), self.search.clone())
    }
}
