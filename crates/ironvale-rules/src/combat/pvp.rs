//! Player-versus-player attacks.
//!
//! One call resolves one blow, not a fight:
//!
//! 1. `raw = attacker strength + weapon roll` (0 if unarmed)
//! 2. `damage = floor(raw · speed modifier · intelligence modifier)`
//! 3. `damage = max(1, damage − defender protection)`
//! 4. `health after = max(0, health − damage)`, a kill at zero
//! 5. On a kill, take a capped percentage of the defender's gold, gems, and
//!    metals.
//!
//! Target eligibility lives in [`super::targeting`]; the caller checks it
//! first and stores the defender's protection window afterwards.

use ironvale_types::{CombatantSnapshot, EquipmentModifiers, Wealth};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::TheftRules;
use crate::equipment::{MIN_DAMAGE, armor_reduction, effective_damage, roll_weapon_damage};
use crate::formulas::intelligence_modifier;

/// Everything needed to resolve one PvP blow.
#[derive(Debug, Clone, Copy)]
pub struct PvpAttack<'a> {
    /// The attacker's snapshot.
    pub attacker: &'a CombatantSnapshot,
    /// The attacker's equipment.
    pub attacker_equipment: &'a EquipmentModifiers,
    /// The defender's snapshot.
    pub defender: &'a CombatantSnapshot,
    /// The defender's equipment.
    pub defender_equipment: &'a EquipmentModifiers,
    /// What the defender holds, for theft on a kill.
    pub defender_wealth: &'a Wealth,
}

/// The result of one PvP blow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PvpOutcome {
    /// The weapon roll.
    pub weapon_damage: u32,
    /// Intelligence multiplier applied.
    pub intelligence_modifier: Decimal,
    /// Damage dealt after protection.
    pub damage: u32,
    /// The defender's health after the blow.
    pub defender_health_after: u32,
    /// Whether the defender reached zero health.
    pub is_kill: bool,
    /// Resources taken (all zero unless a kill).
    pub stolen: Wealth,
}

/// Resolve a single attack.
pub fn resolve_pvp(attack: &PvpAttack<'_>, theft: &TheftRules, rng: &mut impl Rng) -> PvpOutcome {
    let weapon_damage = roll_weapon_damage(
        attack.attacker_equipment.weapon_damage_min,
        attack.attacker_equipment.weapon_damage_max,
        rng,
    );
    let raw = attack
        .attacker
        .strength
        .saturating_add(Decimal::from(weapon_damage));
    let int_mod = intelligence_modifier(attack.attacker.intelligence, attack.defender.intelligence);
    let multiplier = attack
        .attacker_equipment
        .speed_modifier
        .saturating_mul(int_mod);
    let scaled = effective_damage(raw, multiplier);
    let damage = armor_reduction(scaled, attack.defender_equipment.total_protection).max(MIN_DAMAGE);

    let defender_health_after = attack.defender.health.saturating_sub(damage);
    let is_kill = defender_health_after == 0;
    let stolen = if is_kill {
        compute_theft(attack.defender_wealth, theft)
    } else {
        Wealth::default()
    };

    PvpOutcome {
        weapon_damage,
        intelligence_modifier: int_mod,
        damage,
        defender_health_after,
        is_kill,
        stolen,
    }
}

/// What a kill takes: `min(cap, floor(holding · percent / 100))` per resource.
pub fn compute_theft(wealth: &Wealth, rules: &TheftRules) -> Wealth {
    Wealth {
        gold: capped_share(wealth.gold, rules.percent, rules.gold_cap),
        gems: capped_share(wealth.gems, rules.percent, rules.gems_cap),
        metals: capped_share(wealth.metals, rules.percent, rules.metals_cap),
    }
}

fn capped_share(holding: u64, percent: u32, cap: u64) -> u64 {
    let share = u128::from(holding)
        .saturating_mul(u128::from(percent))
        .checked_div(100)
        .unwrap_or(0);
    u64::try_from(share).unwrap_or(u64::MAX).min(cap)
}
