//! TOML configuration for the risk engine.
//!
//! Every key is optional; omitted keys fall back to the built-in defaults.
//! See `config/example.toml` for a complete file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use urbanik_risk_models::{RankingStrategy, RiskThresholds, TieBreak};

use crate::RiskError;
use crate::age_groups::AgeGroupMapping;
use crate::fields::FieldMapping;
use crate::ranking::DEFAULT_TOP_N;

/// Environment variable holding the path of a config file.
pub const CONFIG_ENV_VAR: &str = "URBANIK_RISK_CONFIG";

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Engine configuration, resolved once at startup and passed explicitly to
/// every call that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Ratio thresholds for risk tiers.
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// Number of municipalities in a ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Tie-break policy for dominant categories.
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Ranking strategy used when the caller does not pick one.
    #[serde(default)]
    pub strategy: RankingStrategy,
    /// JSON key aliases for row fields.
    #[serde(default)]
    pub fields: FieldMapping,
    /// Age band label table.
    #[serde(default)]
    pub age_groups: AgeGroupMapping,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            top_n: DEFAULT_TOP_N,
            tie_break: TieBreak::default(),
            strategy: RankingStrategy::default(),
            fields: FieldMapping::default(),
            age_groups: AgeGroupMapping::default(),
        }
    }
}

impl RiskConfig {
    /// Parses and validates a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::Config`] if the TOML is malformed or the values
    /// are inconsistent (see [`RiskConfig::validate`]).
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RiskError> {
        let config: Self = toml::de::from_str(toml_str).map_err(|e| RiskError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::Io`] if the file cannot be read, or
    /// [`RiskError::Config`] if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, RiskError> {
        log::info!("Loading risk config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config from `path`, falling back to the file named by
    /// [`CONFIG_ENV_VAR`], then to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is named but cannot be loaded.
    pub fn resolve(path: Option<&Path>) -> Result<Self, RiskError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.trim().is_empty() => Self::load(Path::new(env_path.trim())),
            _ => {
                log::debug!("No risk config given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Checks that thresholds satisfy `0 < medio <= alto <= 1` and that the
    /// count field has at least one alias.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<(), RiskError> {
        let RiskThresholds { alto, medio } = self.thresholds;
        if !(medio > 0.0 && medio <= alto && alto <= 1.0) {
            return Err(RiskError::Config {
                message: format!(
                    "thresholds must satisfy 0 < medio <= alto <= 1 (got medio={medio}, alto={alto})"
                ),
            });
        }
        if self.fields.count.is_empty() {
            return Err(RiskError::Config {
                message: "fields.count must list at least one alias".to_string(),
            });
        }
        if self.fields.municipio.is_empty() {
            return Err(RiskError::Config {
                message: "fields.municipio must list at least one alias".to_string(),
            });
        }
        Ok(())
    }
}
