//! Configuration loading for the Ironvale game core.
//!
//! The canonical configuration lives in `ironvale-config.yaml` at the project
//! root. Rule sections deserialize straight into the rule structs from
//! `ironvale-rules`; the regeneration and logging sections add the
//! service-level settings the scheduler and engine binary need. Every field
//! has a default, so an empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use ironvale_rules::{CombatRules, PrayerRules, PvpRules, RegenRules, RulesError};
use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "IRONVALE_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but a value is out of range.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// The rule validation failure.
        #[from]
        source: RulesError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `ironvale-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// PvE fight parameters.
    #[serde(default)]
    pub combat: CombatRules,

    /// PvP parameters, theft included.
    #[serde(default)]
    pub pvp: PvpRules,

    /// Temple prayer parameters.
    #[serde(default)]
    pub prayer: PrayerRules,

    /// Regeneration cadences and scheduler timing.
    #[serde(default)]
    pub regen: RegenConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `IRONVALE_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`RulesError::InvalidConfig`] found.
    pub fn validate(&self) -> Result<(), RulesError> {
        self.pvp.validate()?;
        self.prayer.validate()?;
        self.regen.validate()
    }
}

/// Regeneration settings: the rule cadences plus scheduler timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegenConfig {
    /// Mana and PvP mana cadences.
    #[serde(flatten)]
    pub rules: RegenRules,

    /// Seconds between PvP mana sweeps over all players (default: 300).
    pub pvp_sweep_seconds: u64,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            rules: RegenRules::default(),
            pvp_sweep_seconds: 300,
        }
    }
}

impl RegenConfig {
    /// Sweep interval as a [`Duration`].
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.pvp_sweep_seconds)
    }

    /// Check the cadences and that the sweep interval is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] on the first invalid value.
    pub fn validate(&self) -> Result<(), RulesError> {
        self.rules.validate()?;
        if self.pvp_sweep_seconds == 0 {
            return Err(RulesError::InvalidConfig {
                reason: "regen.pvp_sweep_seconds must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Override the level with `IRONVALE_LOG` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            if !val.trim().is_empty() {
                self.level = val;
            }
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
combat:
  fight_mana_cost: 2

pvp:
  new_player_level: 3
  level_range_percent: 0.5
  protection_minutes: 15
  attack_cost: 1
  theft:
    percent: 10
    gold_cap: 500
    gems_cap: 2
    metals_cap: 20

prayer:
  mana_unit: 10
  chunk_size: 100
  variance_min: 0.9
  variance_max: 1.1

regen:
  mana_interval_hours: 4
  pvp_mana_interval_minutes: 30
  pvp_mana_max: 8
  pvp_sweep_seconds: 60

logging:
  level: debug
  format: json
";
        let config = GameConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.combat.fight_mana_cost, 2);
        assert_eq!(config.pvp.new_player_level, 3);
        assert_eq!(config.pvp.level_range_percent, Decimal::new(5, 1));
        assert_eq!(config.pvp.theft.gold_cap, 500);
        assert_eq!(config.prayer.chunk_size, 100);
        assert_eq!(config.prayer.variance_min, Decimal::new(9, 1));
        assert_eq!(config.regen.rules.mana_interval_hours, 4);
        assert_eq!(config.regen.rules.pvp_mana_max, 8);
        assert_eq!(config.regen.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = GameConfig::parse("pvp:\n  protection_minutes: 20\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.pvp.protection_minutes, 20);
        // Everything else uses defaults
        assert_eq!(config.pvp.theft.gold_cap, 100);
        assert_eq!(config.prayer.mana_unit, 5);
        assert_eq!(config.regen.pvp_sweep_seconds, 300);
        assert_eq!(config.regen.rules.pvp_mana_interval_minutes, 60);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GameConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = GameConfig::parse("prayer:\n  variance_min: 2.0\n  variance_max: 1.0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));

        let config = GameConfig::parse("regen:\n  pvp_sweep_seconds: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let config = GameConfig::parse("pvp: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("ironvale-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
