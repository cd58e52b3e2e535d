//! Configuration validation.

use super::Config;
use crate::error::{Result, VerifyError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Ignore rules
    if let Some(policy) = &config.ignore_rules {
        for (i, rule) in policy.rules().iter().enumerate() {
            if rule.predicate.pattern().trim().is_empty() {
                return Err(VerifyError::Config(format!(
                    "ignore_rules[{}] pattern is required",
                    i
                )));
            }
        }
    }

    // REST endpoint
    if config.rest.host.is_empty() {
        return Err(VerifyError::Config("rest.host is required".into()));
    }
    if config.rest.auth_port == 0 {
        return Err(VerifyError::Config("rest.auth_port must be at least 1".into()));
    }
    if config.rest.api_port == 0 {
        return Err(VerifyError::Config("rest.api_port must be at least 1".into()));
    }
    if config.rest.prefix.contains(char::is_whitespace) {
        return Err(VerifyError::Config(format!(
            "rest.prefix must not contain whitespace, got '{}'",
            config.rest.prefix
        )));
    }

    Ok(())
}
