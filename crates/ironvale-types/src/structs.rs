//! Core records for the Ironvale game core.
//!
//! Covers combat snapshots, equipment, monsters, combat logs, PvP
//! protection, stat totals, mana state, the persisted player record, the
//! delta the core hands back to storage, and audit records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Combatant;
use crate::ids::{ItemId, MonsterId, PlayerId};

// ---------------------------------------------------------------------------
// Combat inputs
// ---------------------------------------------------------------------------

/// Read-only view of a fighter at the start of a fight.
///
/// Resolvers never mutate a snapshot; they return new values instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatantSnapshot {
    /// Current health.
    pub health: u32,
    /// Health ceiling derived from level.
    pub max_health: u32,
    /// Flat damage added to every blow.
    #[ts(as = "String")]
    pub strength: Decimal,
    /// Offsets encumbrance.
    #[ts(as = "String")]
    pub speed: Decimal,
    /// Drives the PvP intelligence modifier.
    #[ts(as = "String")]
    pub intelligence: Decimal,
    /// Flat reduction applied after armor protection.
    pub defense: u32,
}

/// Combat stats derived from a player's equipped items.
///
/// Cached per player by the storage layer and recomputed whenever the
/// equipped slots change. A player with nothing equipped uses
/// [`EquipmentModifiers::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipmentModifiers {
    /// Summed protection of all worn armor.
    pub total_protection: u32,
    /// Multiplier in `[0.5, 1.0]` from encumbrance versus speed.
    #[ts(as = "String")]
    pub speed_modifier: Decimal,
    /// Lower bound of the weapon damage roll.
    pub weapon_damage_min: u32,
    /// Upper bound of the weapon damage roll.
    pub weapon_damage_max: u32,
}

impl Default for EquipmentModifiers {
    fn default() -> Self {
        Self {
            total_protection: 0,
            speed_modifier: Decimal::ONE,
            weapon_damage_min: 0,
            weapon_damage_max: 0,
        }
    }
}

/// An item that can be worn or wielded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipmentItem {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Minimum strength needed to equip.
    pub strength_required: u32,
    /// Weight-like burden counted against strength.
    pub encumbrance: u32,
    /// Damage absorbed per hit.
    pub protection: u32,
    /// Lower bound of the weapon damage roll (0 for armor).
    pub damage_min: u32,
    /// Upper bound of the weapon damage roll (0 for armor).
    pub damage_max: u32,
    /// Price in gold.
    pub cost: u64,
}

/// A static catalog monster. Never changes during a fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Monster {
    /// Monster identifier.
    pub id: MonsterId,
    /// Display name.
    pub name: String,
    /// Monster level.
    pub level: u32,
    /// Starting health.
    pub health: u32,
    /// Lower bound of the monster's attack roll.
    pub damage_min: u32,
    /// Upper bound of the monster's attack roll.
    pub damage_max: u32,
    /// Flat reduction applied to the player's blows.
    pub defense: u32,
    /// Experience paid out on a player victory.
    pub experience_reward: u64,
    /// Gold paid out on a player victory.
    pub gold_reward: u64,
    /// Probability in `[0, 1]` of a one-gem drop on a player victory.
    #[ts(as = "String")]
    #[serde(default = "default_gem_drop_rate")]
    pub gem_drop_rate: Decimal,
}

/// Default gem drop probability (5%).
pub fn default_gem_drop_rate() -> Decimal {
    Decimal::new(5, 2)
}

// ---------------------------------------------------------------------------
// Combat outputs
// ---------------------------------------------------------------------------

/// One blow in a fight transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatLogEntry {
    /// 1-based round number.
    pub round: u32,
    /// Who struck.
    pub attacker: Combatant,
    /// Damage dealt after all reductions.
    pub damage: u32,
    /// The target's health after the blow.
    pub target_hp_remaining: u32,
}

/// Payout for a PvE victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rewards {
    /// Experience gained.
    pub experience: u64,
    /// Gold gained.
    pub gold: u64,
    /// Gems gained (0 or 1).
    pub gems: u64,
}

/// Outcome of a full PvE fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatResult {
    /// Whether one side reached zero health.
    pub winner_determined: bool,
    /// The side left standing.
    pub winner: Option<Combatant>,
    /// The player's health at the end of the fight.
    pub final_attacker_hp: u32,
    /// The monster's health at the end of the fight.
    pub final_monster_hp: u32,
    /// Number of rounds fought.
    pub rounds: u32,
    /// Blow-by-blow transcript.
    pub log: Vec<CombatLogEntry>,
    /// Present only when the player won.
    pub rewards: Option<Rewards>,
}

impl CombatResult {
    /// Whether the player won the fight.
    pub fn player_won(&self) -> bool {
        self.winner == Some(Combatant::Player)
    }
}

/// Amounts of each stealable resource.
///
/// Used both for a player's holdings and for what a PvP kill takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Wealth {
    /// Gold coins.
    pub gold: u64,
    /// Gems.
    pub gems: u64,
    /// Metals.
    pub metals: u64,
}

impl Wealth {
    /// Whether every amount is zero.
    pub const fn is_empty(&self) -> bool {
        self.gold == 0 && self.gems == 0 && self.metals == 0
    }
}

/// A window during which a recently attacked player cannot be attacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PvpProtection {
    /// The protected player.
    pub player_id: PlayerId,
    /// Protection lapses once `now` passes this instant.
    pub protected_until: DateTime<Utc>,
    /// Who attacked last.
    pub last_attacker_id: PlayerId,
}

impl PvpProtection {
    /// Whether the protection still applies at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.protected_until
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// A player's trained attributes, carried at 3-decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatTotals {
    /// Strength.
    #[ts(as = "String")]
    pub strength: Decimal,
    /// Speed.
    #[ts(as = "String")]
    pub speed: Decimal,
    /// Intelligence.
    #[ts(as = "String")]
    pub intelligence: Decimal,
}

impl StatTotals {
    /// Build totals from whole-number values.
    pub fn new(strength: u32, speed: u32, intelligence: u32) -> Self {
        Self {
            strength: Decimal::from(strength),
            speed: Decimal::from(speed),
            intelligence: Decimal::from(intelligence),
        }
    }

    /// Sum of all three stats. Selects the praying efficiency tier.
    pub fn total(&self) -> Decimal {
        self.strength
            .saturating_add(self.speed)
            .saturating_add(self.intelligence)
    }

    /// Add prayer gains, keeping 3-decimal precision.
    pub fn apply(&mut self, gains: &StatGains) {
        self.strength = self.strength.saturating_add(gains.strength).round_dp(3);
        self.speed = self.speed.saturating_add(gains.speed).round_dp(3);
        self.intelligence = self
            .intelligence
            .saturating_add(gains.intelligence)
            .round_dp(3);
    }
}

/// Per-stat increases produced by a prayer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatGains {
    /// Strength gained.
    #[ts(as = "String")]
    pub strength: Decimal,
    /// Speed gained.
    #[ts(as = "String")]
    pub speed: Decimal,
    /// Intelligence gained.
    #[ts(as = "String")]
    pub intelligence: Decimal,
}

impl StatGains {
    /// Gains of zero in every stat.
    pub const ZERO: Self = Self {
        strength: Decimal::ZERO,
        speed: Decimal::ZERO,
        intelligence: Decimal::ZERO,
    };

    /// Sum of all three gains.
    pub fn total(&self) -> Decimal {
        self.strength
            .saturating_add(self.speed)
            .saturating_add(self.intelligence)
    }
}

// ---------------------------------------------------------------------------
// Mana
// ---------------------------------------------------------------------------

/// Mana pools and their regeneration timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ManaState {
    /// Combat and prayer mana.
    pub mana: u32,
    /// Ceiling derived from level.
    pub max_mana: u32,
    /// Last full mana restore.
    pub last_mana_regen: DateTime<Utc>,
    /// Attacks available against other players (0--5).
    pub pvp_mana: u32,
    /// Last PvP mana increment.
    pub last_pvp_mana_regen: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Player record
// ---------------------------------------------------------------------------

/// The persisted player record as the core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Character level (1-based).
    pub level: u32,
    /// Experience toward the next level.
    pub experience: u64,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Flat damage reduction.
    pub defense: u32,
    /// Trained stats.
    pub stats: StatTotals,
    /// Mana pools.
    pub mana: ManaState,
    /// Currencies and materials.
    pub wealth: Wealth,
}

impl Player {
    /// The fight-relevant view of this player.
    pub fn combatant(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            health: self.health,
            max_health: self.max_health,
            strength: self.stats.strength,
            speed: self.stats.speed,
            intelligence: self.stats.intelligence,
            defense: self.defense,
        }
    }
}

/// Absolute level and experience after a level-up check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Progression {
    /// New level.
    pub level: u32,
    /// Experience carried toward the following level.
    pub experience: u64,
    /// Health ceiling for the new level.
    pub max_health: u32,
}

/// Absolute mana values written by the regeneration scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegenUpdate {
    /// Full restore: `(mana, max_mana, at)`.
    pub mana_restore: Option<ManaRestore>,
    /// PvP mana catch-up.
    pub pvp_mana: Option<PvpManaRegen>,
}

/// A full mana restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ManaRestore {
    /// Mana after the restore.
    pub mana: u32,
    /// Mana ceiling after the restore.
    pub max_mana: u32,
    /// Timestamp recorded as the last restore.
    pub at: DateTime<Utc>,
}

/// A PvP mana catch-up step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PvpManaRegen {
    /// PvP mana after the catch-up.
    pub pvp_mana: u32,
    /// Timestamp recorded as the last increment.
    pub at: DateTime<Utc>,
}

/// Changes the core asks the storage layer to apply to one player.
///
/// Signed fields are additive; the store clamps pools to their bounds.
/// `progression` and `regen` carry absolute values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerDelta {
    /// Health change.
    pub health: i64,
    /// Mana change.
    pub mana: i64,
    /// PvP mana change.
    pub pvp_mana: i64,
    /// Gold change.
    pub gold: i64,
    /// Gem change.
    pub gems: i64,
    /// Metals change.
    pub metals: i64,
    /// Stat increases from prayer.
    pub stat_gains: StatGains,
    /// New level and experience.
    pub progression: Option<Progression>,
    /// Regeneration writes.
    pub regen: Option<RegenUpdate>,
}

// ---------------------------------------------------------------------------
// Audit records
// ---------------------------------------------------------------------------

/// An entry written to the append-only log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AuditRecord {
    /// A completed PvE fight.
    PveFight {
        /// The fighting player.
        player_id: PlayerId,
        /// The monster fought.
        monster_id: MonsterId,
        /// The full fight result including its transcript.
        result: CombatResult,
        /// When the fight happened.
        at: DateTime<Utc>,
    },
    /// A PvP attack.
    PvpAttack {
        /// The attacker.
        attacker_id: PlayerId,
        /// The defender.
        defender_id: PlayerId,
        /// Damage dealt.
        damage: u32,
        /// Whether the defender was reduced to zero health.
        is_kill: bool,
        /// Resources taken on a kill.
        stolen: Wealth,
        /// When the attack happened.
        at: DateTime<Utc>,
    },
    /// A temple prayer.
    Prayer {
        /// The praying player.
        player_id: PlayerId,
        /// Mana charged.
        mana_spent: u32,
        /// Mana that counted toward gains.
        effective_mana: u32,
        /// Stat increases granted.
        gains: StatGains,
        /// When the prayer happened.
        at: DateTime<Utc>,
    },
}
