//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::source::TableFilter;
use crate::typemap::{IgnorePolicy, IgnorePreset};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Named ignore rule set, used when `ignore_rules` is not given.
    #[serde(default)]
    pub ignore_preset: IgnorePreset,

    /// Explicit ignore rules; replaces the preset entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_rules: Option<IgnorePolicy>,

    /// Which tables are verified.
    #[serde(default)]
    pub tables: TableFilter,

    /// REST API endpoint.
    #[serde(default)]
    pub rest: RestApiConfig,
}

impl Config {
    /// The ignore policy in effect.
    pub fn ignore_policy(&self) -> IgnorePolicy {
        self.ignore_rules
            .clone()
            .unwrap_or_else(|| IgnorePolicy::from_preset(self.ignore_preset))
    }
}

/// REST API endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestApiConfig {
    /// API host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Auth API port (default: 8081).
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// REST API port (default: 8082).
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Path prefix in front of `/v1` (default: none).
    #[serde(default)]
    pub prefix: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            auth_port: default_auth_port(),
            api_port: default_api_port(),
            prefix: String::new(),
        }
    }
}

impl RestApiConfig {
    /// The prefix with a leading `/`, or empty.
    pub fn normalized_prefix(&self) -> String {
        match self.prefix.as_str() {
            "" => String::new(),
            p if p.starts_with('/') => p.to_string(),
            p => format!("/{}", p),
        }
    }

    /// Base URL of the auth API.
    pub fn auth_api_url_base(&self) -> String {
        format!(
            "http://{}:{}{}/v1/auth",
            self.host,
            self.auth_port,
            self.normalized_prefix()
        )
    }

    /// Base URL of the v1 REST API.
    pub fn v1_url_base(&self) -> String {
        format!(
            "http://{}:{}{}/v1",
            self.host,
            self.api_port,
            self.normalized_prefix()
        )
    }
}

// Default value functions for serde
fn default_host() -> String {
    "localhost".to_string()
}

fn default_auth_port() -> u16 {
    8081
}

fn default_api_port() -> u16 {
    8082
}
