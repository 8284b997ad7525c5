//! Pure stat formulas.
//!
//! Level curves (health, mana, experience), the PvP intelligence modifier,
//! the praying efficiency tier, and the encumbrance speed modifier. Nothing
//! here holds state or touches randomness.

use std::sync::LazyLock;

use ironvale_types::Progression;
use rust_decimal::Decimal;

use crate::lookup::ThresholdTable;

/// Level beyond which maximum mana stops growing.
pub const MANA_LEVEL_CAP: u32 = 175;

/// Slowest possible speed modifier (fully encumbered).
pub const MIN_SPEED_MODIFIER: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Intelligence ratio -> PvP damage multiplier.
static INTELLIGENCE_MODIFIERS: LazyLock<ThresholdTable<Decimal>> = LazyLock::new(|| {
    ThresholdTable::new(
        vec![
            (Decimal::new(20, 2), Decimal::new(75, 2)),
            (Decimal::new(40, 2), Decimal::new(80, 2)),
            (Decimal::new(60, 2), Decimal::new(85, 2)),
            (Decimal::new(80, 2), Decimal::new(90, 2)),
            (Decimal::new(100, 2), Decimal::new(95, 2)),
            (Decimal::new(101, 2), Decimal::new(100, 2)),
            (Decimal::new(200, 2), Decimal::new(110, 2)),
            (Decimal::new(300, 2), Decimal::new(120, 2)),
            (Decimal::new(400, 2), Decimal::new(130, 2)),
            (Decimal::new(500, 2), Decimal::new(140, 2)),
        ],
        Decimal::new(150, 2),
    )
});

/// Stat total -> points gained per 50 mana.
static PRAYING_EFFICIENCY: LazyLock<ThresholdTable<Decimal>> = LazyLock::new(|| {
    ThresholdTable::new(
        vec![
            (Decimal::from(1100), Decimal::new(35, 1)),
            (Decimal::from(1300), Decimal::new(25, 1)),
            (Decimal::from(1500), Decimal::new(15, 1)),
        ],
        Decimal::new(11, 1),
    )
});

/// Maximum health at a level: `2·level² + 3·level`.
pub fn max_hp(level: u32) -> u32 {
    let l = u64::from(level);
    let hp = l
        .saturating_mul(l)
        .saturating_mul(2)
        .saturating_add(l.saturating_mul(3));
    u32::try_from(hp).unwrap_or(u32::MAX)
}

/// Maximum mana at a level: `min(level, 175)·3 + 50`.
pub fn max_mana(level: u32) -> u32 {
    level.min(MANA_LEVEL_CAP).saturating_mul(3).saturating_add(50)
}

/// Experience needed to advance from `level`: `150·level² + 200`.
pub fn experience_to_next_level(level: u32) -> u64 {
    let l = u64::from(level);
    l.saturating_mul(l).saturating_mul(150).saturating_add(200)
}

/// PvP damage multiplier from the attacker/defender intelligence ratio.
///
/// Ranges from 0.75 (attacker far less intelligent) to 1.50 (five times or
/// more). A defender with zero intelligence counts as parity when the
/// attacker also has none, and as the maximum ratio otherwise.
pub fn intelligence_modifier(attacker_int: Decimal, defender_int: Decimal) -> Decimal {
    let ratio = if defender_int <= Decimal::ZERO {
        if attacker_int <= Decimal::ZERO {
            Decimal::ONE
        } else {
            Decimal::MAX
        }
    } else {
        attacker_int
            .checked_div(defender_int)
            .unwrap_or(Decimal::MAX)
    };
    INTELLIGENCE_MODIFIERS.lookup(ratio)
}

/// Stat points granted per 50 mana at the given stat total.
///
/// `< 1100 -> 3.5`, `< 1300 -> 2.5`, `< 1500 -> 1.5`, otherwise `1.1`.
pub fn praying_efficiency(total_stats: Decimal) -> Decimal {
    PRAYING_EFFICIENCY.lookup(total_stats)
}

/// Damage multiplier from armor encumbrance relative to speed.
///
/// No encumbrance is full speed (1.0); encumbrance at or above speed is half
/// speed (0.5); in between the modifier falls linearly.
pub fn speed_modifier(speed: Decimal, encumbrance: u32) -> Decimal {
    if encumbrance == 0 {
        return Decimal::ONE;
    }
    let enc = Decimal::from(encumbrance);
    if enc >= speed {
        return MIN_SPEED_MODIFIER;
    }
    let slowdown = enc
        .checked_div(speed)
        .and_then(|fraction| fraction.checked_mul(MIN_SPEED_MODIFIER))
        .unwrap_or(MIN_SPEED_MODIFIER);
    Decimal::ONE
        .saturating_sub(slowdown)
        .clamp(MIN_SPEED_MODIFIER, Decimal::ONE)
}

/// Add experience and apply every level-up it pays for.
///
/// Surplus experience carries into the next level. The returned
/// [`Progression`] holds the new level, the leftover experience, and the
/// health ceiling for that level.
pub fn apply_experience(level: u32, experience: u64, gained: u64) -> Progression {
    let mut level = level.max(1);
    let mut experience = experience.saturating_add(gained);
    loop {
        let needed = experience_to_next_level(level);
        if experience < needed || level == u32::MAX {
            break;
        }
        experience = experience.saturating_sub(needed);
        level = level.saturating_add(1);
    }
    Progression {
        level,
        experience,
        max_health: max_hp(level),
    }
}
