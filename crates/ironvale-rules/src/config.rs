//! Tunable parameters for every rule in this crate.
//!
//! Each struct deserializes from the matching section of
//! `ironvale-config.yaml` (see `ironvale-core::config`), and every field has a
//! default so a partial file is valid. Callers can also build them directly
//! in tests.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::RulesError;

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// Parameters for PvE fights.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Mana charged per monster fight (default: 1).
    pub fight_mana_cost: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self { fight_mana_cost: 1 }
    }
}

// ---------------------------------------------------------------------------
// PvP
// ---------------------------------------------------------------------------

/// Parameters for player-versus-player attacks and target eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PvpRules {
    /// Players at or below this level cannot be attacked by anyone above it
    /// (default: 5).
    pub new_player_level: u32,

    /// Fraction of the attacker's level, rounded up, that bounds the allowed
    /// level difference (default: 0.25).
    pub level_range_percent: Decimal,

    /// Minutes a defender is protected after being attacked (default: 10).
    pub protection_minutes: u32,

    /// PvP mana charged per attack (default: 1).
    pub attack_cost: u32,

    /// Resource theft on a kill.
    pub theft: TheftRules,
}

impl Default for PvpRules {
    fn default() -> Self {
        Self {
            new_player_level: 5,
            level_range_percent: Decimal::new(25, 2),
            protection_minutes: 10,
            attack_cost: 1,
            theft: TheftRules::default(),
        }
    }
}

impl PvpRules {
    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] when the level range is
    /// negative or the theft rules are invalid.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.level_range_percent.is_sign_negative() {
            return Err(RulesError::InvalidConfig {
                reason: "pvp.level_range_percent must not be negative".to_owned(),
            });
        }
        self.theft.validate()
    }
}

/// How much a killer takes from the victim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TheftRules {
    /// Percentage of each holding taken, rounded down (default: 5).
    pub percent: u32,
    /// Most gold taken per kill (default: 100).
    pub gold_cap: u64,
    /// Most gems taken per kill (default: 5).
    pub gems_cap: u64,
    /// Most metals taken per kill (default: 10).
    pub metals_cap: u64,
}

impl Default for TheftRules {
    fn default() -> Self {
        Self {
            percent: 5,
            gold_cap: 100,
            gems_cap: 5,
            metals_cap: 10,
        }
    }
}

impl TheftRules {
    /// Check that the percentage is at most 100.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] if `percent > 100`.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.percent > 100 {
            return Err(RulesError::InvalidConfig {
                reason: format!("pvp.theft.percent must be at most 100, got {}", self.percent),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prayer
// ---------------------------------------------------------------------------

/// Parameters for temple prayer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrayerRules {
    /// Only whole multiples of this many mana count (default: 5).
    pub mana_unit: u32,

    /// Mana per diminishing-returns chunk; efficiency is quoted per chunk
    /// (default: 50).
    pub chunk_size: u32,

    /// Lower bound of the random variance multiplier (default: 0.8).
    pub variance_min: Decimal,

    /// Upper bound of the random variance multiplier (default: 1.2).
    pub variance_max: Decimal,
}

impl Default for PrayerRules {
    fn default() -> Self {
        Self {
            mana_unit: 5,
            chunk_size: 50,
            variance_min: Decimal::new(8, 1),
            variance_max: Decimal::new(12, 1),
        }
    }
}

impl PrayerRules {
    /// Check that units are non-zero and the variance range is ordered.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] on the first invalid value.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.mana_unit == 0 || self.chunk_size == 0 {
            return Err(RulesError::InvalidConfig {
                reason: "prayer.mana_unit and prayer.chunk_size must be at least 1".to_owned(),
            });
        }
        if self.chunk_size.checked_rem(self.mana_unit) != Some(0) {
            return Err(RulesError::InvalidConfig {
                reason: "prayer.chunk_size must be a multiple of prayer.mana_unit".to_owned(),
            });
        }
        if self.variance_min.is_sign_negative() || self.variance_min > self.variance_max {
            return Err(RulesError::InvalidConfig {
                reason: "prayer.variance_min must be non-negative and not above variance_max"
                    .to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Regeneration
// ---------------------------------------------------------------------------

/// Parameters for mana and PvP mana regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegenRules {
    /// Hours between full mana restores, aligned to UTC midnight
    /// (default: 6).
    pub mana_interval_hours: u32,

    /// Minutes a player waits per PvP mana point (default: 60).
    pub pvp_mana_interval_minutes: u32,

    /// PvP mana ceiling (default: 5).
    pub pvp_mana_max: u32,
}

impl Default for RegenRules {
    fn default() -> Self {
        Self {
            mana_interval_hours: 6,
            pvp_mana_interval_minutes: 60,
            pvp_mana_max: 5,
        }
    }
}

impl RegenRules {
    /// Check that both cadences are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] if an interval is zero.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.mana_interval_hours == 0 || self.pvp_mana_interval_minutes == 0 {
            return Err(RulesError::InvalidConfig {
                reason: "regen intervals must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// The full-restore cadence.
    pub fn mana_interval(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::hours(i64::from(self.mana_interval_hours))
    }

    /// The PvP mana cadence.
    pub fn pvp_mana_interval(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::minutes(i64::from(self.pvp_mana_interval_minutes))
    }
}
