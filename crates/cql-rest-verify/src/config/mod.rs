//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use tracing::debug;

use crate::error::{Result, VerifyError};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Apply overrides from the process environment.
    ///
    /// `SKIP_TABLES` (`ks.table,ks.table`) adds to the skip list;
    /// `REST_API_HOST`, `REST_API_PORT`, `REST_API_AUTH_PORT` (or
    /// `REST_AUTH_PORT`) and `REST_API_PREFIX` replace the REST settings.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup("SKIP_TABLES") {
            self.tables.extend_from_list(&list).map_err(|e| {
                VerifyError::Config(format!("SKIP_TABLES: {}", e))
            })?;
        }
        if let Some(host) = lookup("REST_API_HOST") {
            self.rest.host = host;
        }
        if let Some(port) = lookup("REST_API_PORT") {
            self.rest.api_port = parse_port("REST_API_PORT", &port)?;
        }
        if let Some((name, port)) = lookup("REST_API_AUTH_PORT")
            .map(|p| ("REST_API_AUTH_PORT", p))
            .or_else(|| lookup("REST_AUTH_PORT").map(|p| ("REST_AUTH_PORT", p)))
        {
            self.rest.auth_port = parse_port(name, &port)?;
        }
        if let Some(prefix) = lookup("REST_API_PREFIX") {
            self.rest.prefix = prefix;
        }

        debug!("Configuration after overrides: {:?}", self);
        self.validate()?;
        Ok(self)
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| VerifyError::Config(format!("{} must be a port number, got '{}'", name, value)))
}
