//! Equipment-derived combat modifiers and equip validation.
//!
//! Worn items contribute protection (flat damage absorption), encumbrance
//! (which erodes the speed modifier), and a weapon damage range. This module
//! derives [`EquipmentModifiers`] from a set of items, answers whether a
//! single item can be equipped, and validates a whole set for a preview.

use ironvale_types::{EquipmentItem, EquipmentModifiers, ItemId, Player};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::formulas::speed_modifier;

/// Smallest damage any blow can deal.
pub const MIN_DAMAGE: u32 = 1;

// ---------------------------------------------------------------------------
// Single-item checks and damage helpers
// ---------------------------------------------------------------------------

/// Whether an item can be equipped.
///
/// Fails when strength is below the item's requirement, or when the item
/// would push total encumbrance above strength.
pub fn can_equip(
    strength: Decimal,
    item_strength_required: u32,
    current_encumbrance: u32,
    item_encumbrance: u32,
) -> bool {
    if strength < Decimal::from(item_strength_required) {
        return false;
    }
    let total = u64::from(current_encumbrance).saturating_add(u64::from(item_encumbrance));
    Decimal::from(total) <= strength
}

/// `floor(base · speed_modifier)`.
pub fn effective_damage(base: Decimal, speed_mod: Decimal) -> u32 {
    base.saturating_mul(speed_mod)
        .floor()
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Apply flat protection with the damage floor: `max(1, incoming − protection)`.
pub fn armor_reduction(incoming: u32, total_protection: u32) -> u32 {
    incoming.saturating_sub(total_protection).max(MIN_DAMAGE)
}

/// Uniform integer roll in `[min, max]`.
///
/// A degenerate range (`max <= min`) always yields `min` without touching
/// the random source.
pub fn roll_weapon_damage(min: u32, max: u32, rng: &mut impl Rng) -> u32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Derive cached combat modifiers from the equipped items.
///
/// Protection and weapon ranges are summed; the speed modifier comes from
/// total encumbrance against the wearer's speed.
pub fn derive_modifiers(items: &[EquipmentItem], speed: Decimal) -> EquipmentModifiers {
    let mut protection: u32 = 0;
    let mut encumbrance: u32 = 0;
    let mut damage_min: u32 = 0;
    let mut damage_max: u32 = 0;
    for item in items {
        protection = protection.saturating_add(item.protection);
        encumbrance = encumbrance.saturating_add(item.encumbrance);
        damage_min = damage_min.saturating_add(item.damage_min);
        damage_max = damage_max.saturating_add(item.damage_max.max(item.damage_min));
    }
    EquipmentModifiers {
        total_protection: protection,
        speed_modifier: speed_modifier(speed, encumbrance),
        weapon_damage_min: damage_min,
        weapon_damage_max: damage_max,
    }
}

// ---------------------------------------------------------------------------
// Set validation
// ---------------------------------------------------------------------------

/// Why an item (or the set as a whole) failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EquipmentFailure {
    /// The player is not strong enough for the item.
    #[error("{name} requires {required} strength (you have {strength}).")]
    StrengthTooLow {
        /// The item.
        item_id: ItemId,
        /// Item name.
        name: String,
        /// Strength required.
        required: u32,
        /// The player's strength.
        strength: Decimal,
    },

    /// The player cannot afford the item.
    #[error("{name} costs {cost} gold (you have {gold}).")]
    Unaffordable {
        /// The item.
        item_id: ItemId,
        /// Item name.
        name: String,
        /// Item price.
        cost: u64,
        /// The player's gold.
        gold: u64,
    },

    /// The combined set is too heavy.
    #[error("Total encumbrance {encumbrance} exceeds your strength of {strength}.")]
    OverEncumbered {
        /// Summed encumbrance of the set.
        encumbrance: u64,
        /// The player's strength.
        strength: Decimal,
    },
}

/// Sums over a validated set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentTotals {
    /// Summed encumbrance.
    pub encumbrance: u64,
    /// Summed price.
    pub cost: u64,
    /// Speed modifier the set would produce.
    pub speed_modifier: Decimal,
}

/// Result of [`validate_equipment_set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentSetValidation {
    /// Whether there were no failures.
    pub valid: bool,
    /// Every failure found, in item order, with the encumbrance check last.
    pub failures: Vec<EquipmentFailure>,
    /// Set totals (computed even when invalid).
    pub totals: EquipmentTotals,
}

/// Validate a prospective set of items for a player.
///
/// Every item is checked for strength and affordability independently, and
/// all failures are collected. The summed encumbrance is then checked
/// against the player's strength. This is a preview; it does not equip or
/// charge anything.
pub fn validate_equipment_set(player: &Player, items: &[EquipmentItem]) -> EquipmentSetValidation {
    let strength = player.stats.strength;
    let gold = player.wealth.gold;
    let mut failures = Vec::new();
    let mut encumbrance: u64 = 0;
    let mut cost: u64 = 0;

    for item in items {
        if strength < Decimal::from(item.strength_required) {
            failures.push(EquipmentFailure::StrengthTooLow {
                item_id: item.id,
                name: item.name.clone(),
                required: item.strength_required,
                strength,
            });
        }
        if item.cost > gold {
            failures.push(EquipmentFailure::Unaffordable {
                item_id: item.id,
                name: item.name.clone(),
                cost: item.cost,
                gold,
            });
        }
        encumbrance = encumbrance.saturating_add(u64::from(item.encumbrance));
        cost = cost.saturating_add(item.cost);
    }

    if Decimal::from(encumbrance) > strength {
        failures.push(EquipmentFailure::OverEncumbered {
            encumbrance,
            strength,
        });
    }

    let speed = speed_modifier(
        player.stats.speed,
        u32::try_from(encumbrance).unwrap_or(u32::MAX),
    );

    EquipmentSetValidation {
        valid: failures.is_empty(),
        failures,
        totals: EquipmentTotals {
            encumbrance,
            cost,
            speed_modifier: speed,
        },
    }
}
