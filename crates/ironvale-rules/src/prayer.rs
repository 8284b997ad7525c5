//! Temple prayer: trading mana for stat points.
//!
//! Only whole multiples of the mana unit count (5 by default). The counted
//! mana is spent in chunks of up to 50; each chunk earns
//! `(chunk / 50) · efficiency(total stats)` points, scaled by a random
//! variance in `[0.8, 1.2]` and rounded to a whole number. Points earned by
//! one chunk raise the stat total before the next chunk is priced, so large
//! offerings can cross into a lower efficiency tier part-way through.
//!
//! Points are then handed to stats by a [`DistributionStrategy`].

use ironvale_types::{Stat, StatGains, StatTotals};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::PrayerRules;
use crate::error::Rejection;
use crate::formulas::praying_efficiency;

/// Resolution of the variance draw, in parts per million.
const VARIANCE_SCALE: u32 = 6;
const VARIANCE_DENOMINATOR: i64 = 1_000_000;

/// Weight resolution for the three-way split.
const WEIGHT_MAX: u64 = 1_000_000;

/// How prayer points are assigned to stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "stat", rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Random weights across all three stats.
    Weighted3Way,
    /// Everything goes to one stat.
    SingleTarget(Stat),
}

/// The result of one prayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerOutcome {
    /// Mana the player offered (and is charged).
    pub mana_spent: u32,
    /// Mana that counted after truncation to the unit.
    pub effective_mana: u32,
    /// Whole points earned.
    pub points: u32,
    /// Per-stat increases.
    pub gains: StatGains,
}

/// `floor(mana / unit) · unit`.
pub fn effective_mana(mana_spent: u32, rules: &PrayerRules) -> u32 {
    mana_spent
        .checked_div(rules.mana_unit)
        .map_or(0, |units| units.saturating_mul(rules.mana_unit))
}

/// Split counted mana into full chunks followed by at most one smaller one.
pub fn mana_chunks(effective: u32, chunk_size: u32) -> Vec<u32> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut left = effective;
    while left > 0 {
        let chunk = left.min(size);
        chunks.push(chunk);
        left = left.saturating_sub(chunk);
    }
    chunks
}

fn draw_variance(rules: &PrayerRules, rng: &mut impl Rng) -> Decimal {
    let scale = Decimal::from(VARIANCE_DENOMINATOR);
    let to_millionths = |v: Decimal| v.saturating_mul(scale).trunc().to_i64().unwrap_or(0);
    let lo = to_millionths(rules.variance_min);
    let hi = to_millionths(rules.variance_max);
    let drawn = if hi > lo { rng.random_range(lo..=hi) } else { lo };
    Decimal::new(drawn, VARIANCE_SCALE)
}

fn chunk_points(
    chunk: u32,
    total_stats: Decimal,
    rules: &PrayerRules,
    rng: &mut impl Rng,
) -> u32 {
    let expected = Decimal::from(chunk)
        .checked_div(Decimal::from(rules.chunk_size.max(1)))
        .unwrap_or(Decimal::ZERO)
        .saturating_mul(praying_efficiency(total_stats));
    expected
        .saturating_mul(draw_variance(rules, rng))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Whole points a prayer of `mana_spent` earns at the given stats.
///
/// Below one mana unit nothing is earned and no randomness is consumed.
pub fn prayer_points(
    stats: &StatTotals,
    mana_spent: u32,
    rules: &PrayerRules,
    rng: &mut impl Rng,
) -> u32 {
    let effective = effective_mana(mana_spent, rules);
    let mut running_total = stats.total();
    let mut points: u32 = 0;
    for chunk in mana_chunks(effective, rules.chunk_size) {
        let earned = chunk_points(chunk, running_total, rules, rng);
        points = points.saturating_add(earned);
        running_total = running_total.saturating_add(Decimal::from(earned));
    }
    points
}

/// Split `points` across strength, speed, and intelligence at random.
///
/// Three uniform weights are drawn and normalised; each stat gets the floor
/// of its share and the leftover points go one at a time to random stats.
/// The returned counts always sum to `points`.
pub fn distribute_stats_weighted(points: u32, rng: &mut impl Rng) -> [u32; 3] {
    let weights: [u64; 3] = std::array::from_fn(|_| rng.random_range(1..=WEIGHT_MAX));
    let weight_sum: u64 = weights.iter().sum();
    let mut shares = weights.map(|w| {
        u64::from(points)
            .saturating_mul(w)
            .checked_div(weight_sum)
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(0)
    });

    let handed_out: u32 = shares.iter().fold(0, |acc, s| acc.saturating_add(*s));
    for _ in 0..points.saturating_sub(handed_out) {
        let pick = rng.random_range(0..shares.len());
        if let Some(share) = shares.get_mut(pick) {
            *share = share.saturating_add(1);
        }
    }
    shares
}

fn gains_from_points(points: u32, strategy: DistributionStrategy, rng: &mut impl Rng) -> StatGains {
    let [strength, speed, intelligence] = match strategy {
        DistributionStrategy::Weighted3Way => distribute_stats_weighted(points, rng),
        DistributionStrategy::SingleTarget(Stat::Strength) => [points, 0, 0],
        DistributionStrategy::SingleTarget(Stat::Speed) => [0, points, 0],
        DistributionStrategy::SingleTarget(Stat::Intelligence) => [0, 0, points],
    };
    StatGains {
        strength: Decimal::from(strength).round_dp(3),
        speed: Decimal::from(speed).round_dp(3),
        intelligence: Decimal::from(intelligence).round_dp(3),
    }
}

/// Work out what a prayer yields.
///
/// Pure: the caller charges `mana_spent` and applies the gains.
pub fn calculate_stat_gains(
    stats: &StatTotals,
    mana_spent: u32,
    strategy: DistributionStrategy,
    rules: &PrayerRules,
    rng: &mut impl Rng,
) -> PrayerOutcome {
    let effective = effective_mana(mana_spent, rules);
    let points = prayer_points(stats, mana_spent, rules, rng);
    let gains = if points == 0 {
        StatGains::ZERO
    } else {
        gains_from_points(points, strategy, rng)
    };

    tracing::debug!(
        mana_spent,
        effective_mana = effective,
        points,
        strategy = ?strategy,
        "Prayer resolved"
    );

    PrayerOutcome {
        mana_spent,
        effective_mana: effective,
        points,
        gains,
    }
}

/// Parse the mana amount a player typed.
///
/// Accepts a positive whole number, or `all` / `max` for every point of
/// mana the player currently has.
///
/// # Errors
///
/// Returns [`Rejection::MalformedManaAmount`] for anything else, zero
/// included.
pub fn parse_mana_amount(token: &str, available: u32) -> Result<u32, Rejection> {
    let trimmed = token.trim();
    if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("max") {
        return Ok(available);
    }
    match trimmed.parse::<u32>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(Rejection::MalformedManaAmount {
            token: token.to_owned(),
        }),
    }
}

/// Parse the stat a player asked to pray for.
///
/// # Errors
///
/// Returns [`Rejection::InvalidStat`] if the name is not a trainable stat.
pub fn parse_stat(name: &str) -> Result<Stat, Rejection> {
    name.parse::<Stat>()
        .map_err(|err| Rejection::InvalidStat { name: err.0 })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn stats_totalling(total: u32) -> StatTotals {
        StatTotals::new(total, 0, 0)
    }

    #[test]
    fn below_one_unit_earns_nothing() {
        let rules = PrayerRules::default();
        let mut rng = SmallRng::seed_from_u64(1);
        for mana in 0..5 {
            let out = calculate_stat_gains(
                &StatTotals::new(10, 10, 10),
                mana,
                DistributionStrategy::Weighted3Way,
                &rules,
                &mut rng,
            );
            assert_eq!(out.effective_mana, 0);
            assert_eq!(out.points, 0);
            assert_eq!(out.gains, StatGains::ZERO);
        }
    }

    #[test]
    fn mana_is_truncated_to_whole_units() {
        let rules = PrayerRules::default();
        let stats = StatTotals::new(10, 10, 10);
        let baseline = {
            let mut rng = SmallRng::seed_from_u64(77);
            calculate_stat_gains(&stats, 5, DistributionStrategy::Weighted3Way, &rules, &mut rng)
        };
        for mana in 6..=9 {
            let mut rng = SmallRng::seed_from_u64(77);
            let out =
                calculate_stat_gains(&stats, mana, DistributionStrategy::Weighted3Way, &rules, &mut rng);
            assert_eq!(out.effective_mana, 5);
            assert_eq!(out.mana_spent, mana);
            assert_eq!(out.points, baseline.points);
            assert_eq!(out.gains, baseline.gains);
        }
    }

    #[test]
    fn chunks_end_with_smaller_remainder() {
        assert_eq!(mana_chunks(120, 50), vec![50, 50, 20]);
        assert_eq!(mana_chunks(50, 50), vec![50]);
        assert!(mana_chunks(0, 50).is_empty());
    }

    #[test]
    fn low_total_earns_three_or_four_per_chunk() {
        let rules = PrayerRules::default();
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let points = prayer_points(&stats_totalling(100), 50, &rules, &mut rng);
            assert!((3..=4).contains(&points), "got {points}");
        }
    }

    #[test]
    fn top_tier_earns_one_per_chunk() {
        let rules = PrayerRules::default();
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert_eq!(prayer_points(&stats_totalling(2000), 50, &rules, &mut rng), 1);
        }
    }

    #[test]
    fn crossing_a_tier_mid_prayer_lowers_later_chunks() {
        let rules = PrayerRules::default();
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            // First chunk at 3.5 (3..=4), second priced at >= 1102 so 2.5 (2..=3).
            let points = prayer_points(&stats_totalling(1099), 100, &rules, &mut rng);
            assert!((5..=7).contains(&points), "got {points}");
        }
    }

    #[test]
    fn weighted_distribution_conserves_points() {
        let mut rng = SmallRng::seed_from_u64(5);
        for points in 0..300 {
            let split = distribute_stats_weighted(points, &mut rng);
            assert_eq!(split.iter().sum::<u32>(), points);
        }
    }

    #[test]
    fn single_target_puts_everything_in_one_stat() {
        let rules = PrayerRules::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let out = calculate_stat_gains(
            &StatTotals::new(10, 10, 10),
            100,
            DistributionStrategy::SingleTarget(Stat::Speed),
            &rules,
            &mut rng,
        );
        assert!(out.points > 0);
        assert_eq!(out.gains.speed, Decimal::from(out.points));
        assert_eq!(out.gains.strength, Decimal::ZERO);
        assert_eq!(out.gains.intelligence, Decimal::ZERO);
    }

    #[test]
    fn weighted_gains_match_points() {
        let rules = PrayerRules::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let out = calculate_stat_gains(
            &StatTotals::new(10, 10, 10),
            500,
            DistributionStrategy::Weighted3Way,
            &rules,
            &mut rng,
        );
        assert_eq!(out.gains.total(), Decimal::from(out.points));
    }

    #[test]
    fn parse_mana_amount_accepts_numbers_and_all() {
        assert_eq!(parse_mana_amount("25", 60), Ok(25));
        assert_eq!(parse_mana_amount(" all ", 60), Ok(60));
        assert_eq!(parse_mana_amount("MAX", 42), Ok(42));
        assert!(matches!(
            parse_mana_amount("lots", 60),
            Err(Rejection::MalformedManaAmount { .. })
        ));
        assert!(parse_mana_amount("-5", 60).is_err());
        assert!(parse_mana_amount("0", 60).is_err());
    }

    #[test]
    fn parse_stat_maps_unknown_names() {
        assert_eq!(parse_stat("int"), Ok(Stat::Intelligence));
        assert_eq!(
            parse_stat("luck"),
            Err(Rejection::InvalidStat {
                name: String::from("luck")
            })
        );
    }
}
