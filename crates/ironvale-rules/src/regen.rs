//! Mana and PvP mana regeneration math.
//!
//! Two clocks run side by side:
//!
//! - **Mana** is restored in full on wall-clock boundaries that are whole
//!   multiples of the mana interval since the Unix epoch (UTC midnight
//!   aligned for any interval dividing a day). A restore is due whenever a
//!   boundary has passed since the player's last restore; missing several
//!   boundaries still yields one restore, since each is a full refill.
//! - **PvP mana** grows by one point per full interval since the player's
//!   own last increment, up to the cap. Only whole intervals are consumed so
//!   progress toward the next point carries over; a player who reaches the
//!   cap has their timestamp moved to `now`.
//!
//! The scheduler in `ironvale-core` decides *when* to evaluate these; this
//! module only answers *what* changes.

use chrono::{DateTime, TimeDelta, Utc};
use ironvale_types::{ManaRestore, ManaState, Player, PvpManaRegen, RegenUpdate};

use crate::config::RegenRules;
use crate::formulas::max_mana;

/// The most recent cadence boundary at or before `now`.
pub fn last_boundary(now: DateTime<Utc>, cadence: TimeDelta) -> DateTime<Utc> {
    let step = cadence.num_seconds().max(1);
    now.timestamp()
        .checked_div_euclid(step)
        .and_then(|n| n.checked_mul(step))
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(now)
}

/// The first cadence boundary strictly after `now`.
pub fn next_boundary(now: DateTime<Utc>, cadence: TimeDelta) -> DateTime<Utc> {
    let step = TimeDelta::seconds(cadence.num_seconds().max(1));
    last_boundary(now, cadence)
        .checked_add_signed(step)
        .unwrap_or(now)
}

/// Whether a mana boundary has passed since the last restore.
pub fn mana_restore_due(
    last_mana_regen: DateTime<Utc>,
    now: DateTime<Utc>,
    rules: &RegenRules,
) -> bool {
    last_boundary(now, rules.mana_interval()) > last_mana_regen
}

/// A full restore for a player at `level`, stamped `at`.
pub fn full_mana_restore(level: u32, at: DateTime<Utc>) -> ManaRestore {
    let ceiling = max_mana(level);
    ManaRestore {
        mana: ceiling,
        max_mana: ceiling,
        at,
    }
}

/// PvP mana owed since `last`, or `None` if no full interval has elapsed.
pub fn pvp_mana_catch_up(
    pvp_mana: u32,
    last: DateTime<Utc>,
    now: DateTime<Utc>,
    rules: &RegenRules,
) -> Option<PvpManaRegen> {
    let interval = rules.pvp_mana_interval();
    let elapsed = now.signed_duration_since(last);
    let whole = elapsed
        .num_seconds()
        .checked_div(interval.num_seconds())
        .unwrap_or(0);
    if whole <= 0 {
        return None;
    }

    let earned = u32::try_from(whole).unwrap_or(u32::MAX);
    let topped = pvp_mana.saturating_add(earned).min(rules.pvp_mana_max);
    if topped >= rules.pvp_mana_max {
        return Some(PvpManaRegen {
            pvp_mana: rules.pvp_mana_max,
            at: now,
        });
    }

    let advanced = interval
        .checked_mul(i32::try_from(whole).unwrap_or(i32::MAX))
        .and_then(|d| last.checked_add_signed(d))
        .unwrap_or(now);
    Some(PvpManaRegen {
        pvp_mana: topped,
        at: advanced,
    })
}

/// Everything that should be regenerated for `mana` at `now`.
pub fn plan_mana_regen(
    level: u32,
    mana: &ManaState,
    now: DateTime<Utc>,
    rules: &RegenRules,
) -> Option<RegenUpdate> {
    let mana_restore = mana_restore_due(mana.last_mana_regen, now, rules)
        .then(|| full_mana_restore(level, last_boundary(now, rules.mana_interval())));
    let pvp_mana = pvp_mana_catch_up(mana.pvp_mana, mana.last_pvp_mana_regen, now, rules);

    if mana_restore.is_none() && pvp_mana.is_none() {
        return None;
    }
    Some(RegenUpdate {
        mana_restore,
        pvp_mana,
    })
}

/// Everything that should be regenerated for `player` at `now`.
pub fn plan_regen(player: &Player, now: DateTime<Utc>, rules: &RegenRules) -> Option<RegenUpdate> {
    plan_mana_regen(player.level, &player.mana, now, rules)
}
