//! End-to-end tests for the `ironvale-core` action layer.
//!
//! Every test wires a `GameService` and a `RegenScheduler` to one
//! `InMemoryStore` and a `ManualClock`, then drives a short session the
//! way the web layer would.

// Integration tests use unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ironvale_core::{
    Clock, Collaborators, GameConfig, GameService, InMemoryStore, ManualClock, PlayerRepository,
    RegenScheduler,
};
use ironvale_rules::{experience_to_next_level, max_hp, max_mana};
use ironvale_types::{
    AuditRecord, EquipmentItem, ItemId, ManaState, Monster, MonsterId, Player, PlayerId,
    RejectionReason, StatTotals, Wealth,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;

// =============================================================================
// Helpers
// =============================================================================

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 30, 0).unwrap()
}

struct World {
    store: Arc<InMemoryStore>,
    clock: Arc<ManualClock>,
    game: GameService,
    config: GameConfig,
}

fn world() -> World {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(epoch()));
    let config = GameConfig::default();
    let game = GameService::new(
        Collaborators::in_memory(&store, Arc::clone(&clock) as Arc<dyn Clock>),
        &config,
    );
    World {
        store,
        clock,
        game,
        config,
    }
}

fn new_player(name: &str, level: u32, strength: u32) -> Player {
    Player {
        id: PlayerId::new(),
        name: name.to_owned(),
        level,
        experience: 0,
        health: max_hp(level),
        max_health: max_hp(level),
        defense: 0,
        stats: StatTotals::new(strength, 10, 10),
        mana: ManaState {
            mana: max_mana(level),
            max_mana: max_mana(level),
            last_mana_regen: epoch(),
            pvp_mana: 5,
            last_pvp_mana_regen: epoch(),
        },
        wealth: Wealth {
            gold: 200,
            gems: 10,
            metals: 20,
        },
    }
}

fn wolf() -> Monster {
    Monster {
        id: MonsterId::new(),
        name: String::from("Grey Wolf"),
        level: 2,
        health: 30,
        damage_min: 2,
        damage_max: 5,
        defense: 1,
        experience_reward: 400,
        gold_reward: 60,
        gem_drop_rate: Decimal::ONE,
    }
}

// =============================================================================
// PvE
// =============================================================================

#[test]
fn winning_fight_levels_up_and_is_audited() {
    let w = world();
    let hero = new_player("Hero", 1, 40);
    let id = hero.id;
    let monster = wolf();
    let monster_id = monster.id;
    w.store.insert_player(hero);
    w.store.insert_monster(monster);

    let mut rng = SmallRng::seed_from_u64(21);
    let report = w.game.fight_monster(id, monster_id, &mut rng).unwrap();

    assert!(report.result.player_won());
    assert!(report.leveled_up);
    assert_eq!(report.player.level, 2);
    assert_eq!(
        report.player.experience,
        400 - experience_to_next_level(1)
    );
    assert_eq!(report.player.max_health, max_hp(2));
    assert_eq!(report.player.wealth.gold, 260);
    // A drop rate of 1 always pays a gem.
    assert_eq!(report.player.wealth.gems, 11);

    let log = w.store.audit_log();
    assert_eq!(log.len(), 1);
    assert!(matches!(
        &log[0],
        AuditRecord::PveFight { player_id, .. } if *player_id == id
    ));
}

#[test]
fn armor_changes_fight_through_equipment() {
    let w = world();
    let hero = new_player("Tank", 1, 40);
    let id = hero.id;
    w.store.insert_player(hero);
    w.store.equip(
        id,
        vec![EquipmentItem {
            id: ItemId::new(),
            name: String::from("Tower Shield"),
            strength_required: 10,
            encumbrance: 5,
            protection: 50,
            damage_min: 0,
            damage_max: 0,
            cost: 100,
        }],
    );
    let modifiers = w.store.equipment_modifiers(id).unwrap();
    assert_eq!(modifiers.total_protection, 50);
    assert_eq!(modifiers.speed_modifier, Decimal::new(75, 2));

    let mut monster = wolf();
    monster.health = 200;
    let monster_id = monster.id;
    w.store.insert_monster(monster);

    let mut rng = SmallRng::seed_from_u64(4);
    let report = w.game.fight_monster(id, monster_id, &mut rng).unwrap();
    // The shield absorbs every bite down to the 1-damage floor.
    assert!(
        report
            .result
            .log
            .iter()
            .filter(|e| e.attacker == ironvale_types::Combatant::Monster)
            .all(|e| e.damage == 1)
    );
}

// =============================================================================
// PvP
// =============================================================================

#[test]
fn pvp_session_with_protection_and_regen() {
    let w = world();
    let attacker = new_player("Raider", 12, 30);
    let defender = new_player("Farmer", 11, 8);
    let (aid, did) = (attacker.id, defender.id);
    w.store.insert_player(attacker);
    w.store.insert_player(defender);

    let targets = w.game.list_targets(aid).unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, did);

    let mut rng = SmallRng::seed_from_u64(8);
    let report = w.game.attack_player(aid, did, &mut rng).unwrap();
    assert_eq!(report.outcome.damage, 30);
    assert_eq!(report.attacker.mana.pvp_mana, 4);

    // Protected now, and no longer listed.
    assert!(w.game.list_targets(aid).unwrap().is_empty());
    let err = w.game.attack_player(aid, did, &mut rng).unwrap_err();
    assert_eq!(err.reason(), Some(RejectionReason::TargetProtected));

    // Protection lapses after ten minutes; spend the remaining PvP mana.
    for _ in 0..4 {
        w.clock.advance(TimeDelta::minutes(10));
        w.game.attack_player(aid, did, &mut rng).unwrap();
    }
    w.clock.advance(TimeDelta::minutes(10));
    let err = w.game.attack_player(aid, did, &mut rng).unwrap_err();
    assert_eq!(err.reason(), Some(RejectionReason::InsufficientPvpMana));
    let farmer = w.store.player(did).unwrap().unwrap();
    assert_eq!(farmer.health, max_hp(11) - 5 * 30);

    // Three hours on, the scheduler's catch-up tops PvP mana back up by 3.
    w.clock.set(epoch() + TimeDelta::hours(3));
    let scheduler = RegenScheduler::new(
        Arc::clone(&w.store) as Arc<dyn PlayerRepository>,
        Arc::clone(&w.clock) as Arc<dyn Clock>,
        w.config.regen.clone(),
    );
    scheduler.catch_up().unwrap();
    let raider = w.store.player(aid).unwrap().unwrap();
    assert_eq!(raider.mana.pvp_mana, 3);
}

#[test]
fn rejected_attacks_leave_no_trace() {
    let w = world();
    let veteran = new_player("Veteran", 30, 50);
    let rookie = new_player("Rookie", 2, 5);
    let (vid, rid) = (veteran.id, rookie.id);
    w.store.insert_player(veteran.clone());
    w.store.insert_player(rookie.clone());

    let mut rng = SmallRng::seed_from_u64(2);
    let cases = [
        (vid, vid, RejectionReason::SelfAttack),
        (vid, rid, RejectionReason::NewPlayerShield),
        (vid, PlayerId::new(), RejectionReason::TargetNotFound),
        (rid, vid, RejectionReason::LevelRange),
    ];
    for (a, d, expected) in cases {
        let err = w.game.attack_player(a, d, &mut rng).unwrap_err();
        assert_eq!(err.reason(), Some(expected));
    }

    assert_eq!(w.store.player(vid).unwrap(), Some(veteran));
    assert_eq!(w.store.player(rid).unwrap(), Some(rookie));
    assert!(w.store.audit_log().is_empty());
}

// =============================================================================
// Prayer
// =============================================================================

#[test]
fn praying_with_everything_spends_all_mana() {
    let w = world();
    let monk = new_player("Monk", 20, 10);
    let id = monk.id;
    w.store.insert_player(monk);

    let mut rng = SmallRng::seed_from_u64(31);
    let report = w.game.pray(id, "all", None, &mut rng).unwrap();

    // 110 mana at level 20: two full chunks and one of 10.
    assert_eq!(report.outcome.mana_spent, max_mana(20));
    assert_eq!(report.outcome.effective_mana, 110);
    assert_eq!(report.player.mana.mana, 0);
    assert_eq!(
        report.player.stats.total(),
        Decimal::from(30_u32.saturating_add(report.outcome.points))
    );
    assert!(matches!(
        w.store.audit_log().last(),
        Some(AuditRecord::Prayer { mana_spent: 110, .. })
    ));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn shipped_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../ironvale-config.yaml");
    let config = GameConfig::from_file(&path).unwrap();
    let defaults = GameConfig::default();
    assert_eq!(config.combat, defaults.combat);
    assert_eq!(config.pvp, defaults.pvp);
    assert_eq!(config.prayer, defaults.prayer);
    assert_eq!(config.regen, defaults.regen);
    assert_eq!(config.logging.format, defaults.logging.format);
}
