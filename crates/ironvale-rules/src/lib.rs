//! Game rules for the Ironvale simulation core.
//!
//! Everything in this crate is a synchronous computation over snapshots:
//! no I/O, no clocks, no global state. Randomness is always passed in as a
//! `rand::Rng` so callers (and tests) control it. The `ironvale-core` crate
//! wires these rules to storage and time.
//!
//! # Modules
//!
//! - [`combat`] -- PvE fights, PvP blows, and PvP target eligibility
//! - [`config`] -- Tunable parameters for each rule family
//! - [`equipment`] -- Equip checks, damage helpers, and set validation
//! - [`error`] -- [`RulesError`] and the player-facing [`Rejection`]
//! - [`formulas`] -- Level curves, intelligence and speed modifiers, prayer tiers
//! - [`lookup`] -- The ordered [`ThresholdTable`] behind the stepped formulas
//! - [`prayer`] -- Mana-to-stat conversion with chunked diminishing returns
//! - [`regen`] -- Mana restore boundaries and PvP mana catch-up

pub mod combat;
pub mod config;
pub mod equipment;
pub mod error;
pub mod formulas;
pub mod lookup;
pub mod prayer;
pub mod regen;

// Re-export primary types at crate root for convenience.
pub use combat::pve::resolve_pve;
pub use combat::pvp::{PvpAttack, PvpOutcome, compute_theft, resolve_pvp};
pub use combat::targeting::{
    TargetProfile, eligible_targets, max_level_gap, new_protection, validate_target,
};
pub use config::{CombatRules, PrayerRules, PvpRules, RegenRules, TheftRules};
pub use equipment::{
    EquipmentFailure, EquipmentSetValidation, EquipmentTotals, can_equip, derive_modifiers,
    validate_equipment_set,
};
pub use error::{Rejection, RulesError};
pub use formulas::{
    apply_experience, experience_to_next_level, intelligence_modifier, max_hp, max_mana,
    praying_efficiency, speed_modifier,
};
pub use lookup::ThresholdTable;
pub use prayer::{
    DistributionStrategy, PrayerOutcome, calculate_stat_gains, parse_mana_amount, parse_stat,
};
pub use regen::{next_boundary, plan_regen};
