//! Error and rejection types for the ironvale-rules crate.
//!
//! Two families live here:
//!
//! - [`RulesError`] -- a rules configuration value is out of range. These
//!   are operator mistakes, never player-facing.
//! - [`Rejection`] -- a player action was refused because a precondition
//!   failed or the target is invalid. Every rejection carries a stable
//!   [`RejectionReason`] code and a human-readable message (its `Display`).

use chrono::{DateTime, Utc};
use ironvale_types::RejectionReason;

/// Errors raised by rule evaluation or rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A rules configuration value is out of range.
    #[error("invalid rules configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// A refused player action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The acting player does not exist.
    #[error("Player not found.")]
    PlayerNotFound,

    /// The monster does not exist.
    #[error("That monster does not exist.")]
    MonsterNotFound,

    /// The PvP target does not exist.
    #[error("That player does not exist.")]
    TargetNotFound,

    /// A player tried to attack themselves.
    #[error("You cannot attack yourself.")]
    SelfAttack,

    /// The target is still under the new-player shield.
    #[error("Players at level {shield_level} or below are protected from veterans.")]
    NewPlayerShield {
        /// Highest level covered by the shield.
        shield_level: u32,
    },

    /// The level gap is wider than the attacker's range.
    #[error(
        "A level {target_level} player is out of range; at level {attacker_level} you can attack players within {max_gap} levels."
    )]
    LevelRange {
        /// Attacker's level.
        attacker_level: u32,
        /// Target's level.
        target_level: u32,
        /// Largest allowed level difference.
        max_gap: u32,
    },

    /// The target was attacked recently.
    #[error("That player was attacked recently and is protected for another {remaining_minutes} minute(s).")]
    TargetProtected {
        /// When the protection lapses.
        protected_until: DateTime<Utc>,
        /// Whole minutes left, rounded up.
        remaining_minutes: i64,
    },

    /// The target is already down.
    #[error("That player has already been defeated.")]
    TargetDefeated,

    /// Not enough mana.
    #[error("You need {required} mana but only have {available}.")]
    InsufficientMana {
        /// Mana the action costs.
        required: u32,
        /// Mana the player has.
        available: u32,
    },

    /// Not enough PvP mana.
    #[error("You have no PvP mana left ({available} available). It regenerates hourly.")]
    InsufficientPvpMana {
        /// PvP mana the player has.
        available: u32,
    },

    /// The acting player has no health left.
    #[error("You are too wounded to fight. Rest until your health returns.")]
    InsufficientHealth,

    /// The stat name is not trainable.
    #[error("'{name}' is not a stat you can pray for. Choose strength, speed, or intelligence.")]
    InvalidStat {
        /// The name that was supplied.
        name: String,
    },

    /// The mana amount could not be parsed.
    #[error("'{token}' is not a valid mana amount.")]
    MalformedManaAmount {
        /// The token that was supplied.
        token: String,
    },

    /// The mana amount is below one prayer unit.
    #[error("You must offer at least {minimum} mana.")]
    ManaBelowMinimum {
        /// Smallest accepted amount.
        minimum: u32,
        /// Amount that was offered.
        requested: u32,
    },
}

impl Rejection {
    /// The stable reason code for this rejection.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::PlayerNotFound => RejectionReason::PlayerNotFound,
            Self::MonsterNotFound => RejectionReason::MonsterNotFound,
            Self::TargetNotFound => RejectionReason::TargetNotFound,
            Self::SelfAttack => RejectionReason::SelfAttack,
            Self::NewPlayerShield { .. } => RejectionReason::NewPlayerShield,
            Self::LevelRange { .. } => RejectionReason::LevelRange,
            Self::TargetProtected { .. } => RejectionReason::TargetProtected,
            Self::TargetDefeated => RejectionReason::TargetDefeated,
            Self::InsufficientMana { .. } => RejectionReason::InsufficientMana,
            Self::InsufficientPvpMana { .. } => RejectionReason::InsufficientPvpMana,
            Self::InsufficientHealth => RejectionReason::InsufficientHealth,
            Self::InvalidStat { .. } => RejectionReason::InvalidStat,
            Self::MalformedManaAmount { .. } => RejectionReason::MalformedManaAmount,
            Self::ManaBelowMinimum { .. } => RejectionReason::ManaBelowMinimum,
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
