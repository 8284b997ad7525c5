//! Enumeration types for the Ironvale game core.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Trainable stats
// ---------------------------------------------------------------------------

/// One of the three attributes a player can train at the temple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Stat {
    /// Adds to every blow and bounds how much equipment can be carried.
    Strength,
    /// Offsets encumbrance from worn armor.
    Speed,
    /// Scales PvP damage relative to the defender's intelligence.
    Intelligence,
}

impl Stat {
    /// Lowercase name used in requests and audit records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Speed => "speed",
            Self::Intelligence => "intelligence",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a trainable stat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stat: {0}")]
pub struct UnknownStat(pub String);

impl FromStr for Stat {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" => Ok(Self::Strength),
            "speed" | "spd" => Ok(Self::Speed),
            "intelligence" | "int" => Ok(Self::Intelligence),
            _ => Err(UnknownStat(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Combat sides
// ---------------------------------------------------------------------------

/// Which side of a PvE fight acted in a log entry or won the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Combatant {
    /// The player character.
    Player,
    /// The monster being fought.
    Monster,
}

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Stable, machine-readable reason an action was rejected.
///
/// The string form ([`RejectionReason::as_str`]) is part of the public
/// contract with the client and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// The player does not exist.
    PlayerNotFound,
    /// The monster does not exist.
    MonsterNotFound,
    /// The PvP target does not exist.
    TargetNotFound,
    /// A player tried to attack themselves.
    SelfAttack,
    /// A veteran tried to attack a player still under the new-player shield.
    NewPlayerShield,
    /// The level gap between attacker and target is too wide.
    LevelRange,
    /// The target was attacked recently and is still protected.
    TargetProtected,
    /// The target has no health left to lose.
    TargetDefeated,
    /// Not enough mana for the action.
    InsufficientMana,
    /// Not enough PvP mana for an attack.
    InsufficientPvpMana,
    /// The acting player has no health left.
    InsufficientHealth,
    /// The stat name is not one of strength, speed, intelligence.
    InvalidStat,
    /// The mana amount could not be parsed.
    MalformedManaAmount,
    /// The mana amount is below the smallest prayer unit.
    ManaBelowMinimum,
}

impl RejectionReason {
    /// Kebab-case reason code sent to the client.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerNotFound => "player-not-found",
            Self::MonsterNotFound => "monster-not-found",
            Self::TargetNotFound => "target-not-found",
            Self::SelfAttack => "self-attack",
            Self::NewPlayerShield => "new-player-shield",
            Self::LevelRange => "level-range",
            Self::TargetProtected => "target-protected",
            Self::TargetDefeated => "target-defeated",
            Self::InsufficientMana => "insufficient-mana",
            Self::InsufficientPvpMana => "insufficient-pvp-mana",
            Self::InsufficientHealth => "insufficient-health",
            Self::InvalidStat => "invalid-stat",
            Self::MalformedManaAmount => "malformed-mana-amount",
            Self::ManaBelowMinimum => "mana-below-minimum",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_parses_names_and_abbreviations() {
        assert_eq!("strength".parse::<Stat>(), Ok(Stat::Strength));
        assert_eq!(" Speed ".parse::<Stat>(), Ok(Stat::Speed));
        assert_eq!("INT".parse::<Stat>(), Ok(Stat::Intelligence));
        assert!("charisma".parse::<Stat>().is_err());
    }

    #[test]
    fn rejection_reason_serializes_as_code() {
        let json = serde_json::to_string(&RejectionReason::SelfAttack).unwrap_or_default();
        assert_eq!(json, "\"self-attack\"");
        let json = serde_json::to_string(&RejectionReason::InsufficientPvpMana).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", RejectionReason::InsufficientPvpMana.as_str()));
    }
}
