//! Writer configuration.
//!
//! [`WriterConfig::load`] reads `<config dir>/crashlog-writer/config.json` when
//! it exists and then applies environment overrides. Every value is checked
//! before a writer is built; an inverted severity pair is refused.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::severity::Severity;
use crate::translator::BoilerplateRule;

pub const ENV_MIN_SEVERITY: &str = "CRASHLOG_MIN_SEVERITY";
pub const ENV_MIN_CRASH_SEVERITY: &str = "CRASHLOG_MIN_CRASH_SEVERITY";
pub const ENV_PRINT_TAG: &str = "CRASHLOG_PRINT_TAG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterConfig {
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
    #[serde(default = "default_min_crash_severity")]
    pub min_crash_severity: Severity,
    #[serde(default = "default_print_tag")]
    pub print_tag: bool,
    /// Rule for plain-text platform traces.
    #[serde(default)]
    pub boilerplate: BoilerplateRule,
    /// Rule for structured Rust backtrace frames.
    #[serde(default = "BoilerplateRule::rust")]
    pub rust_boilerplate: BoilerplateRule,
}

fn default_min_severity() -> Severity {
    Severity::Verbose
}

fn default_min_crash_severity() -> Severity {
    Severity::Error
}

fn default_print_tag() -> bool {
    true
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            min_severity: default_min_severity(),
            min_crash_severity: default_min_crash_severity(),
            print_tag: default_print_tag(),
            boilerplate: BoilerplateRule::default(),
            rust_boilerplate: BoilerplateRule::rust(),
        }
    }
}

impl WriterConfig {
    pub fn new(min_severity: Severity, min_crash_severity: Severity, print_tag: bool) -> Self {
        Self {
            min_severity,
            min_crash_severity,
            print_tag,
            ..Self::default()
        }
    }

    /// Load the user config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = get_config_path()?;
        let config = if path.exists() {
            info!("[CONFIG] Loading {:?}", path);
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CRASHLOG_*` variables from the environment or a `.env` file.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MIN_SEVERITY) {
            self.min_severity = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MIN_CRASH_SEVERITY) {
            self.min_crash_severity = value.parse()?;
        }
        if let Some(value) = lookup(ENV_PRINT_TAG) {
            self.print_tag = parse_flag(ENV_PRINT_TAG, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_severity > self.min_crash_severity {
            warn!(
                "[CONFIG] Rejected severities: min {} above crash {}",
                self.min_severity, self.min_crash_severity
            );
            return Err(ConfigError::SeverityOrder {
                min: self.min_severity,
                crash: self.min_crash_severity,
            });
        }
        Ok(())
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("crashlog-writer").join("config.json"))
        .ok_or(ConfigError::ConfigDirError)
}
