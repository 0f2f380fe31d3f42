//! Configuration validation, run when a config file is loaded

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Trait for validating configurations
pub trait ConfigValidator {
    fn validate(&self, config: &Config) -> Result<()>;
}

/// Checks the values that end up on a tool command line
pub struct MainConfigValidator;

impl MainConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Disabled checks are joined with commas into a single `-d` argument,
    /// so an entry must not contain separators itself.
    fn validate_disabled_check(&self, check: &str) -> Result<()> {
        if check.is_empty() {
            return Err(Error::ConfigError(
                "disabled_checks contains an empty entry".to_string(),
            ));
        }
        if check.contains(',') || check.chars().any(char::is_whitespace) {
            return Err(Error::ConfigError(format!(
                "disabled check '{check}' must be a single message id or name"
            )));
        }
        Ok(())
    }
}

impl Default for MainConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for MainConfigValidator {
    fn validate(&self, config: &Config) -> Result<()> {
        for check in &config.disabled_checks {
            self.validate_disabled_check(check)?;
        }

        for (tool, settings) in &config.tools {
            if settings.extra_args.iter().any(|arg| arg.is_empty()) {
                return Err(Error::ConfigError(format!(
                    "tools.{tool}.extra_args contains an empty argument"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolSettings;
    use crate::types::ToolName;
    use std::collections::BTreeMap;

    #[test]
    fn test_accepts_ids_and_names() {
        let config = Config {
            disabled_checks: vec!["C0111".to_string(), "missing-docstring".to_string()],
            ..Default::default()
        };
        assert!(MainConfigValidator::new().validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_joined_checks() {
        let config = Config {
            disabled_checks: vec!["C0111,W0612".to_string()],
            ..Default::default()
        };
        let err = MainConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("single message id"));
    }

    #[test]
    fn test_rejects_empty_extra_arg() {
        let config = Config {
            tools: BTreeMap::from([(
                ToolName::Pep8,
                ToolSettings {
                    extra_args: vec![String::new()],
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };
        let err = MainConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("tools.pep8.extra_args"));
    }
}
