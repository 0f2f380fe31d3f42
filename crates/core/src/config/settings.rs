use crate::{
    error::{Error, Result},
    interfaces::ConfigStore,
    types::{Interpreter, ToolName},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::validation::{ConfigValidator, MainConfigValidator};

/// File names looked up by `find_config_file`, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".checkrunner.json", "checkrunner.json"];

/// Per-tool settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolSettings {
    /// Interpreter used for this tool only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Default Python interpreter for every Python-based tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_path: Option<PathBuf>,
    #[serde(default = "default_compile_on_save")]
    pub compile_on_save: bool,
    /// Pylint message ids or names passed through `-d`
    #[serde(default)]
    pub disabled_checks: Vec<String>,
    #[serde(default)]
    pub tools: BTreeMap<ToolName, ToolSettings>,
}

fn default_compile_on_save() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python_path: None,
            php_path: None,
            compile_on_save: default_compile_on_save(),
            disabled_checks: Vec::new(),
            tools: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        MainConfigValidator::new().validate(&config)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config above `start_path`, or the defaults when
    /// there is none. An absent config is a valid state.
    pub fn load_nearest(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found above {:?}, using defaults", start_path);
                Ok(Self::default())
            }
        }
    }

    fn family_default(&self, interpreter: Interpreter) -> Option<&PathBuf> {
        match interpreter {
            Interpreter::Python => self.python_path.as_ref(),
            Interpreter::Php => self.php_path.as_ref(),
        }
    }
}

impl ConfigStore for Config {
    fn interpreter_path(&self, tool: ToolName) -> Option<PathBuf> {
        self.tools
            .get(&tool)
            .and_then(|settings| settings.interpreter.as_ref())
            .or_else(|| self.family_default(tool.interpreter()))
            .filter(|path| !path.as_os_str().is_empty())
            .cloned()
    }

    fn extra_args(&self, tool: ToolName) -> Vec<String> {
        self.tools
            .get(&tool)
            .map(|settings| settings.extra_args.clone())
            .unwrap_or_default()
    }

    fn disabled_checks(&self) -> Vec<String> {
        self.disabled_checks.clone()
    }

    fn compile_on_save(&self) -> bool {
        self.compile_on_save
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            python_path: Some(PathBuf::from("/usr/bin/python3")),
            disabled_checks: vec!["C0111".to_string(), "W0612".to_string()],
            tools: BTreeMap::from([(
                ToolName::Pylint,
                ToolSettings {
                    interpreter: Some(PathBuf::from("/opt/py311/bin/python")),
                    extra_args: vec!["--jobs=2".to_string()],
                },
            )]),
            ..Default::default()
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert!(parsed.compile_on_save);
        assert!(json.contains("\"pylint\""));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.compile_on_save);
    }

    #[test]
    fn test_interpreter_lookup_order() {
        let config = Config {
            python_path: Some(PathBuf::from("/usr/bin/python3")),
            tools: BTreeMap::from([(
                ToolName::Pylint,
                ToolSettings {
                    interpreter: Some(PathBuf::from("/venv/bin/python")),
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };

        assert_eq!(
            config.interpreter_path(ToolName::Pylint),
            Some(PathBuf::from("/venv/bin/python"))
        );
        assert_eq!(
            config.interpreter_path(ToolName::Pep8),
            Some(PathBuf::from("/usr/bin/python3"))
        );
        assert_eq!(config.interpreter_path(ToolName::Php), None);
    }

    #[test]
    fn test_empty_path_counts_as_unconfigured() {
        let config = Config {
            python_path: Some(PathBuf::new()),
            ..Default::default()
        };
        assert_eq!(config.interpreter_path(ToolName::Compile), None);
    }

    #[test]
    fn test_find_and_load_nearest() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("pkg").join("sub");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::load_nearest(&nested).unwrap(), Config::default());

        let config = Config {
            php_path: Some(PathBuf::from("/usr/bin/php")),
            ..Default::default()
        };
        let path = temp_dir.path().join(".checkrunner.json");
        std::fs::write(&path, r#"{ "php_path": "/usr/bin/php" }"#).unwrap();

        assert_eq!(Config::find_config_file(&nested), Some(path));
        assert_eq!(Config::load_nearest(&nested).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("checkrunner.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
