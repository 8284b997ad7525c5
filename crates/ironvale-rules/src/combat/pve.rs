//! Player-versus-monster combat.
//!
//! A fight runs round by round until one side reaches zero health:
//!
//! 1. The player strikes: `strength + weapon roll`, scaled by the speed
//!    modifier and floored, minus the monster's defense (floor 1).
//! 2. If the monster is dead the fight ends before it can answer.
//! 3. The monster strikes: its damage roll, minus the player's armor
//!    protection (floor 1), minus the player's defense (floor 1).
//! 4. If the player is dead the monster wins.
//!
//! Every blow deals at least 1 damage, so a fight always terminates. Rewards
//! are paid only on a player victory. The resolver assumes valid inputs;
//! callers check mana and health before starting a fight.

use ironvale_types::{
    CombatLogEntry, CombatResult, CombatantSnapshot, Combatant, EquipmentModifiers, Monster,
    Rewards,
};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::equipment::{armor_reduction, effective_damage, roll_weapon_damage};

/// Damage the player deals to the monster in one blow.
pub fn player_blow(
    player: &CombatantSnapshot,
    equipment: &EquipmentModifiers,
    monster_defense: u32,
    rng: &mut impl Rng,
) -> u32 {
    let weapon = roll_weapon_damage(
        equipment.weapon_damage_min,
        equipment.weapon_damage_max,
        rng,
    );
    let base = player.strength.saturating_add(Decimal::from(weapon));
    let effective = effective_damage(base, equipment.speed_modifier);
    armor_reduction(effective, monster_defense)
}

/// Damage the monster deals to the player in one blow.
pub fn monster_blow(
    monster: &Monster,
    player_defense: u32,
    total_protection: u32,
    rng: &mut impl Rng,
) -> u32 {
    let raw = roll_weapon_damage(monster.damage_min, monster.damage_max, rng);
    let after_armor = armor_reduction(raw, total_protection);
    armor_reduction(after_armor, player_defense)
}

/// Whether a victory drops a gem.
///
/// One fresh draw against `rate`; rates at or below 0 never drop and rates
/// at or above 1 always drop.
pub fn roll_gem_drop(rate: Decimal, rng: &mut impl Rng) -> bool {
    let p = rate.to_f64().unwrap_or(0.0);
    if p <= 0.0 {
        return false;
    }
    rng.random::<f64>() < p
}

/// Fight a monster to the finish.
///
/// The snapshots are read-only; the returned [`CombatResult`] carries the
/// final health of both sides, the transcript, and rewards when the player
/// won.
pub fn resolve_pve(
    player: &CombatantSnapshot,
    equipment: &EquipmentModifiers,
    monster: &Monster,
    rng: &mut impl Rng,
) -> CombatResult {
    let mut player_hp = player.health;
    let mut monster_hp = monster.health;
    let mut log = Vec::new();
    let mut round: u32 = 0;

    let winner = loop {
        round = round.saturating_add(1);

        let dealt = player_blow(player, equipment, monster.defense, rng);
        monster_hp = monster_hp.saturating_sub(dealt);
        log.push(CombatLogEntry {
            round,
            attacker: Combatant::Player,
            damage: dealt,
            target_hp_remaining: monster_hp,
        });
        if monster_hp == 0 {
            break Combatant::Player;
        }

        let received = monster_blow(monster, player.defense, equipment.total_protection, rng);
        player_hp = player_hp.saturating_sub(received);
        log.push(CombatLogEntry {
            round,
            attacker: Combatant::Monster,
            damage: received,
            target_hp_remaining: player_hp,
        });
        if player_hp == 0 {
            break Combatant::Monster;
        }
    };

    let rewards = (winner == Combatant::Player).then(|| Rewards {
        experience: monster.experience_reward,
        gold: monster.gold_reward,
        gems: u64::from(roll_gem_drop(monster.gem_drop_rate, rng)),
    });

    tracing::debug!(
        monster = %monster.name,
        rounds = round,
        winner = ?winner,
        player_hp,
        "PvE fight resolved"
    );

    CombatResult {
        winner_determined: true,
        winner: Some(winner),
        final_attacker_hp: player_hp,
        final_monster_hp: monster_hp,
        rounds: round,
        log,
        rewards,
    }
}

#[cfg(test)]
mod tests {
    use ironvale_types::MonsterId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn rat() -> Monster {
        Monster {
            id: MonsterId::new(),
            name: String::from("Giant Rat"),
            level: 1,
            health: 10,
            damage_min: 1,
            damage_max: 4,
            defense: 0,
            experience_reward: 25,
            gold_reward: 25,
            gem_drop_rate: Decimal::new(5, 2),
        }
    }

    fn fighter(strength: u32, health: u32) -> CombatantSnapshot {
        CombatantSnapshot {
            health,
            max_health: health,
            strength: Decimal::from(strength),
            speed: Decimal::from(10),
            intelligence: Decimal::from(10),
            defense: 0,
        }
    }

    #[test]
    fn strong_player_kills_rat_and_is_paid() {
        let player = fighter(25, 100);
        let equipment = EquipmentModifiers::default();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let result = resolve_pve(&player, &equipment, &rat(), &mut rng);
            assert!(result.winner_determined);
            assert!(result.player_won());
            // 25 damage against 10 health: one blow, no counterattack.
            assert_eq!(result.rounds, 1);
            assert_eq!(result.log.len(), 1);
            assert_eq!(result.final_monster_hp, 0);
            assert_eq!(result.final_attacker_hp, 100);
            let rewards = result.rewards.unwrap_or_default();
            assert_eq!(rewards.experience, 25);
            assert_eq!(rewards.gold, 25);
            assert!(rewards.gems <= 1);
        }
    }

    #[test]
    fn weak_player_loses_without_rewards() {
        let player = fighter(0, 3);
        let equipment = EquipmentModifiers::default();
        let mut monster = rat();
        monster.health = 1000;
        let mut rng = SmallRng::seed_from_u64(3);
        let result = resolve_pve(&player, &equipment, &monster, &mut rng);
        assert_eq!(result.winner, Some(Combatant::Monster));
        assert_eq!(result.final_attacker_hp, 0);
        assert!(result.rewards.is_none());
        // Player always opens, so the log alternates and ends on the monster.
        assert_eq!(result.log.first().map(|e| e.attacker), Some(Combatant::Player));
        assert_eq!(result.log.last().map(|e| e.attacker), Some(Combatant::Monster));
    }

    #[test]
    fn zero_strength_still_deals_floor_damage() {
        let player = fighter(0, 1000);
        let mut monster = rat();
        monster.defense = 50;
        let mut rng = SmallRng::seed_from_u64(11);
        let result = resolve_pve(&player, &EquipmentModifiers::default(), &monster, &mut rng);
        assert!(result.player_won());
        assert_eq!(result.rounds, 10);
        assert!(result
            .log
            .iter()
            .filter(|e| e.attacker == Combatant::Player)
            .all(|e| e.damage == 1));
    }

    #[test]
    fn protection_and_defense_both_floor_at_one() {
        let monster = rat();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            assert_eq!(monster_blow(&monster, 100, 100, &mut rng), 1);
        }
    }

    #[test]
    fn speed_modifier_scales_player_damage() {
        let player = fighter(20, 10);
        let equipment = EquipmentModifiers {
            speed_modifier: Decimal::new(5, 1),
            ..EquipmentModifiers::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(player_blow(&player, &equipment, 0, &mut rng), 10);
        assert_eq!(player_blow(&player, &equipment, 4, &mut rng), 6);
    }

    #[test]
    fn log_tracks_remaining_health() {
        let player = fighter(3, 200);
        let mut rng = SmallRng::seed_from_u64(9);
        let result = resolve_pve(&player, &EquipmentModifiers::default(), &rat(), &mut rng);
        let monster_hits: Vec<_> = result
            .log
            .iter()
            .filter(|e| e.attacker == Combatant::Player)
            .map(|e| e.target_hp_remaining)
            .collect();
        assert_eq!(monster_hits, vec![7, 4, 1, 0]);
    }

    #[test]
    fn gem_drop_extremes() {
        let mut rng = SmallRng::seed_from_u64(2);
        assert!(!roll_gem_drop(Decimal::ZERO, &mut rng));
        assert!(roll_gem_drop(Decimal::ONE, &mut rng));
    }
}
