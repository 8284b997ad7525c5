//! Who may attack whom.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. the target exists
//! 2. the target is not the attacker
//! 3. new-player shield: an attacker above the shield level cannot hit a
//!    target at or below it
//! 4. level range: `|attacker − target| ≤ ceil(attacker · level_range_percent)`
//! 5. the target is not inside a protection window
//! 6. the target still has health; a defeated player stays down until
//!    healed instead of being robbed again
//!
//! After a successful attack the caller stores [`new_protection`] for the
//! defender.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use ironvale_types::{Player, PlayerId, PvpProtection};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::PvpRules;
use crate::error::Rejection;

/// The parts of a player that eligibility depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetProfile {
    /// The player.
    pub id: PlayerId,
    /// Current level.
    pub level: u32,
    /// Current health.
    pub health: u32,
}

impl From<&Player> for TargetProfile {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            level: player.level,
            health: player.health,
        }
    }
}

/// Largest level difference an attacker at `attacker_level` may bridge.
pub fn max_level_gap(attacker_level: u32, rules: &PvpRules) -> u32 {
    Decimal::from(attacker_level)
        .saturating_mul(rules.level_range_percent)
        .ceil()
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Whole minutes left on a protection window, rounded up.
pub fn remaining_minutes(protected_until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = protected_until.signed_duration_since(now).num_seconds();
    let seconds = u64::try_from(seconds).unwrap_or(0);
    i64::try_from(seconds.div_ceil(60)).unwrap_or(i64::MAX)
}

/// Check every eligibility rule for one target.
///
/// `target` is `None` when the lookup found nothing. `protection` is the
/// target's current protection record, if any.
///
/// # Errors
///
/// Returns the first [`Rejection`] in check order.
pub fn validate_target(
    attacker: &TargetProfile,
    target: Option<&TargetProfile>,
    protection: Option<&PvpProtection>,
    now: DateTime<Utc>,
    rules: &PvpRules,
) -> Result<(), Rejection> {
    let target = target.ok_or(Rejection::TargetNotFound)?;

    if target.id == attacker.id {
        return Err(Rejection::SelfAttack);
    }

    if attacker.level > rules.new_player_level && target.level <= rules.new_player_level {
        return Err(Rejection::NewPlayerShield {
            shield_level: rules.new_player_level,
        });
    }

    let max_gap = max_level_gap(attacker.level, rules);
    if attacker.level.abs_diff(target.level) > max_gap {
        return Err(Rejection::LevelRange {
            attacker_level: attacker.level,
            target_level: target.level,
            max_gap,
        });
    }

    if let Some(p) = protection.filter(|p| p.is_active(now)) {
        return Err(Rejection::TargetProtected {
            protected_until: p.protected_until,
            remaining_minutes: remaining_minutes(p.protected_until, now),
        });
    }

    if target.health == 0 {
        return Err(Rejection::TargetDefeated);
    }

    Ok(())
}

/// Filter a candidate list down to the players the attacker may hit now.
///
/// Candidate order is preserved.
pub fn eligible_targets<'a>(
    attacker: &TargetProfile,
    candidates: &'a [TargetProfile],
    protections: &HashMap<PlayerId, PvpProtection>,
    now: DateTime<Utc>,
    rules: &PvpRules,
) -> Vec<&'a TargetProfile> {
    candidates
        .iter()
        .filter(|c| validate_target(attacker, Some(*c), protections.get(&c.id), now, rules).is_ok())
        .collect()
}

/// The protection record written for a defender after an attack.
pub fn new_protection(
    defender: PlayerId,
    attacker: PlayerId,
    now: DateTime<Utc>,
    rules: &PvpRules,
) -> PvpProtection {
    PvpProtection {
        player_id: defender,
        protected_until: now
            .checked_add_signed(TimeDelta::minutes(i64::from(rules.protection_minutes)))
            .unwrap_or(now),
        last_attacker_id: attacker,
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use ironvale_types::RejectionReason;

    use super::*;

    fn profile(level: u32) -> TargetProfile {
        TargetProfile {
            id: PlayerId::new(),
            level,
            health: 100,
        }
    }

    fn check(a: &TargetProfile, t: &TargetProfile) -> Result<(), Rejection> {
        validate_target(a, Some(t), None, Utc::now(), &PvpRules::default())
    }

    #[test]
    fn missing_target_is_not_found() {
        let a = profile(10);
        let err = validate_target(&a, None, None, Utc::now(), &PvpRules::default());
        assert_eq!(err, Err(Rejection::TargetNotFound));
    }

    #[test]
    fn self_attack_is_rejected() {
        let a = profile(10);
        let err = check(&a, &a).map_err(|r| r.reason());
        assert_eq!(err, Err(RejectionReason::SelfAttack));
    }

    #[test]
    fn shield_protects_low_levels_from_veterans() {
        assert!(matches!(
            check(&profile(6), &profile(5)),
            Err(Rejection::NewPlayerShield { shield_level: 5 })
        ));
        // Two new players may fight each other.
        assert!(check(&profile(5), &profile(4)).is_ok());
        assert!(check(&profile(3), &profile(5)).is_ok());
    }

    #[test]
    fn level_gap_rounds_up() {
        assert_eq!(max_level_gap(20, &PvpRules::default()), 5);
        assert_eq!(max_level_gap(21, &PvpRules::default()), 6);
        assert_eq!(max_level_gap(1, &PvpRules::default()), 1);
        assert!(check(&profile(20), &profile(25)).is_ok());
        assert!(check(&profile(20), &profile(15)).is_ok());
        assert!(matches!(
            check(&profile(20), &profile(26)),
            Err(Rejection::LevelRange { max_gap: 5, .. })
        ));
    }

    #[test]
    fn level_range_is_configurable() {
        let rules = PvpRules {
            level_range_percent: Decimal::new(50, 2),
            ..PvpRules::default()
        };
        let a = profile(20);
        let t = profile(30);
        assert!(validate_target(&a, Some(&t), None, Utc::now(), &rules).is_ok());
    }

    #[test]
    fn active_protection_blocks_with_minutes_left() {
        let now = Utc::now();
        let a = profile(20);
        let t = profile(20);
        let p = new_protection(t.id, PlayerId::new(), now, &PvpRules::default());
        let later = now + TimeDelta::seconds(30);
        let err = validate_target(&a, Some(&t), Some(&p), later, &PvpRules::default());
        assert!(matches!(
            err,
            Err(Rejection::TargetProtected {
                remaining_minutes: 10,
                ..
            })
        ));
    }

    #[test]
    fn expired_protection_allows_attack() {
        let now = Utc::now();
        let a = profile(20);
        let t = profile(20);
        let p = new_protection(t.id, a.id, now, &PvpRules::default());
        assert_eq!(p.last_attacker_id, a.id);
        let expiry = p.protected_until;
        assert!(validate_target(&a, Some(&t), Some(&p), expiry, &PvpRules::default()).is_ok());
    }

    #[test]
    fn checks_run_in_order() {
        // Self-attack is reported before the shield even for a low-level
        // veteran comparison.
        let a = profile(3);
        assert_eq!(check(&a, &a), Err(Rejection::SelfAttack));
        // Shield beats level range.
        assert!(matches!(
            check(&profile(40), &profile(2)),
            Err(Rejection::NewPlayerShield { .. })
        ));
    }

    #[test]
    fn defeated_target_cannot_be_attacked_again() {
        let a = profile(20);
        let t = TargetProfile {
            health: 0,
            ..profile(20)
        };
        assert_eq!(check(&a, &t), Err(Rejection::TargetDefeated));
        // Protection is reported first while it lasts.
        let now = Utc::now();
        let p = new_protection(t.id, a.id, now, &PvpRules::default());
        assert!(matches!(
            validate_target(&a, Some(&t), Some(&p), now, &PvpRules::default()),
            Err(Rejection::TargetProtected { .. })
        ));
        let expiry = p.protected_until;
        assert_eq!(
            validate_target(&a, Some(&t), Some(&p), expiry, &PvpRules::default()),
            Err(Rejection::TargetDefeated)
        );
    }

    #[test]
    fn eligible_targets_filters_candidates() {
        let now = Utc::now();
        let rules = PvpRules::default();
        let attacker = profile(20);
        let ok = profile(22);
        let shielded = profile(4);
        let far = profile(40);
        let guarded = profile(18);
        let downed = TargetProfile {
            health: 0,
            ..profile(21)
        };
        let mut protections = HashMap::new();
        protections.insert(
            guarded.id,
            new_protection(guarded.id, PlayerId::new(), now, &rules),
        );
        let candidates = [attacker, ok, shielded, far, guarded, downed];
        let eligible = eligible_targets(&attacker, &candidates, &protections, now, &rules);
        assert_eq!(eligible, vec![&ok]);
    }

    #[test]
    fn remaining_minutes_rounds_up() {
        let now = Utc::now();
        assert_eq!(remaining_minutes(now + TimeDelta::seconds(61), now), 2);
        assert_eq!(remaining_minutes(now + TimeDelta::seconds(60), now), 1);
        assert_eq!(remaining_minutes(now, now), 0);
        assert_eq!(remaining_minutes(now - TimeDelta::seconds(5), now), 0);
    }
}
