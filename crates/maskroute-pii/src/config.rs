//! Masking engine configuration

use crate::error::{Error, Result};
use crate::matcher::DEFAULT_PHONE_MAX_DIGITS;
use crate::substitution::SubstitutionStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskerConfig {
    /// Enable email detection
    #[serde(default = "default_true")]
    pub detect_email: bool,

    /// Enable credit card detection
    #[serde(default = "default_true")]
    pub detect_credit_card: bool,

    /// Enable phone number detection
    #[serde(default = "default_true")]
    pub detect_phone_number: bool,

    /// Enable person name detection
    #[serde(default = "default_true")]
    pub detect_name: bool,

    /// Enable organization detection
    #[serde(default = "default_true")]
    pub detect_organization: bool,

    /// Phone candidates with more digits than this are discarded
    #[serde(default = "default_phone_max_digits")]
    pub phone_max_digits: usize,

    /// How replacements are applied to text
    #[serde(default)]
    pub substitution: SubstitutionStrategy,

    /// Larger inputs are rejected as malformed
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    /// Attempts per value before giving up on a collision-free replacement
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: usize,

    /// Seed for reproducible synthetic values
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub recognizer: RecognizerConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Register the entity matcher at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON gazetteer for the built-in rule-based recognizer
    #[serde(default)]
    pub gazetteer: Option<PathBuf>,
}

impl Default for MaskerConfig {
    fn default() -> Self {
        Self {
            detect_email: true,
            detect_credit_card: true,
            detect_phone_number: true,
            detect_name: true,
            detect_organization: true,
            phone_max_digits: default_phone_max_digits(),
            substitution: SubstitutionStrategy::default(),
            max_input_bytes: default_max_input_bytes(),
            max_generation_attempts: default_max_generation_attempts(),
            seed: None,
            recognizer: RecognizerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gazetteer: None,
        }
    }
}

impl MaskerConfig {
    /// Load configuration from a YAML or TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("MASKROUTE_SUBSTITUTION") {
            match val.to_lowercase().as_str() {
                "simultaneous" => self.substitution = SubstitutionStrategy::Simultaneous,
                "sequential" => self.substitution = SubstitutionStrategy::Sequential,
                _ => warn!("Invalid MASKROUTE_SUBSTITUTION '{}', keeping {:?}", val, self.substitution),
            }
        }

        if let Some(val) = lookup("MASKROUTE_SEED") {
            match val.parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => warn!("Invalid MASKROUTE_SEED '{}', ignoring", val),
            }
        }

        if let Some(val) = lookup("MASKROUTE_MAX_INPUT_BYTES") {
            match val.parse::<usize>() {
                Ok(max) => self.max_input_bytes = max,
                Err(_) => warn!(
                    "Invalid MASKROUTE_MAX_INPUT_BYTES '{}', keeping {}",
                    val, self.max_input_bytes
                ),
            }
        }

        if let Some(val) = lookup("MASKROUTE_PHONE_MAX_DIGITS") {
            match val.parse::<usize>() {
                Ok(max) => self.phone_max_digits = max,
                Err(_) => warn!(
                    "Invalid MASKROUTE_PHONE_MAX_DIGITS '{}', keeping {}",
                    val, self.phone_max_digits
                ),
            }
        }

        if let Some(val) = lookup("MASKROUTE_GAZETTEER") {
            self.recognizer.gazetteer = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("MASKROUTE_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_input_bytes == 0 {
            return Err(Error::Config("max_input_bytes must be greater than 0".to_string()));
        }
        if self.max_generation_attempts == 0 {
            return Err(Error::Config(
                "max_generation_attempts must be greater than 0".to_string(),
            ));
        }
        if self.phone_max_digits == 0 {
            return Err(Error::Config("phone_max_digits must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Whether any regex category is enabled
    pub fn regex_enabled(&self) -> bool {
        self.detect_email || self.detect_credit_card || self.detect_phone_number
    }

    /// Whether the entity matcher should be registered
    pub fn entities_enabled(&self) -> bool {
        self.recognizer.enabled && (self.detect_name || self.detect_organization)
    }
}

fn default_true() -> bool {
    true
}

fn default_phone_max_digits() -> usize {
    DEFAULT_PHONE_MAX_DIGITS
}

fn default_max_input_bytes() -> usize {
    1024 * 1024
}

fn default_max_generation_attempts() -> usize {
    32
}

fn default_log_level() -> String {
    "warn".to_string()
}
