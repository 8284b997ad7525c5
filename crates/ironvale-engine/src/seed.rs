//! Starting world for a freshly launched engine.
//!
//! The `seed` section of `ironvale-config.yaml` lists the monster catalog
//! and any players to create at startup. Both lists are optional; without a
//! `seed` section the engine starts with an empty store.
//!
//! ```yaml
//! seed:
//!   monsters:
//!     - name: Cave Rat
//!       level: 1
//!       health: 10
//!       damage_min: 1
//!       damage_max: 3
//!       experience_reward: 25
//!       gold_reward: 5
//!   players:
//!     - name: Aldric
//!       level: 8
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use ironvale_core::InMemoryStore;
use ironvale_rules::{max_hp, max_mana};
use ironvale_types::{ManaState, Monster, MonsterId, Player, PlayerId, StatTotals, Wealth};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::EngineError;

/// The `seed` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Monsters added to the catalog.
    pub monsters: Vec<SeedMonster>,
    /// Players created at full health and mana.
    pub players: Vec<SeedPlayer>,
}

/// A catalog monster without an id; one is assigned at load.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedMonster {
    /// Display name.
    pub name: String,
    /// Monster level.
    pub level: u32,
    /// Starting health.
    pub health: u32,
    /// Lower bound of the attack roll.
    pub damage_min: u32,
    /// Upper bound of the attack roll.
    pub damage_max: u32,
    /// Flat damage reduction.
    #[serde(default)]
    pub defense: u32,
    /// Experience paid on defeat.
    pub experience_reward: u64,
    /// Gold paid on defeat.
    pub gold_reward: u64,
    /// Gem drop probability.
    #[serde(default = "ironvale_types::default_gem_drop_rate")]
    pub gem_drop_rate: Decimal,
}

/// A starting player.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPlayer {
    /// Display name.
    pub name: String,
    /// Starting level (default: 1).
    #[serde(default = "default_level")]
    pub level: u32,
    /// Starting value of every stat (default: 10).
    #[serde(default = "default_stat")]
    pub stats: u32,
    /// Starting gold (default: 100).
    #[serde(default = "default_gold")]
    pub gold: u64,
}

const fn default_level() -> u32 {
    1
}

const fn default_stat() -> u32 {
    10
}

const fn default_gold() -> u64 {
    100
}

impl SeedMonster {
    fn into_monster(self) -> Monster {
        Monster {
            id: MonsterId::new(),
            name: self.name,
            level: self.level,
            health: self.health,
            damage_min: self.damage_min,
            damage_max: self.damage_max,
            defense: self.defense,
            experience_reward: self.experience_reward,
            gold_reward: self.gold_reward,
            gem_drop_rate: self.gem_drop_rate,
        }
    }
}

impl SeedPlayer {
    fn into_player(self, now: DateTime<Utc>) -> Player {
        let level = self.level.max(1);
        Player {
            id: PlayerId::new(),
            name: self.name,
            level,
            experience: 0,
            health: max_hp(level),
            max_health: max_hp(level),
            defense: 0,
            stats: StatTotals::new(self.stats, self.stats, self.stats),
            mana: ManaState {
                mana: max_mana(level),
                max_mana: max_mana(level),
                last_mana_regen: now,
                pvp_mana: 5,
                last_pvp_mana_regen: now,
            },
            wealth: Wealth {
                gold: self.gold,
                gems: 0,
                metals: 0,
            },
        }
    }
}

/// Read the `seed` section from the config file, if the file has one.
pub fn load_seed(path: &Path) -> Result<SeedConfig, EngineError> {
    if !path.exists() {
        return Ok(SeedConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Seed {
        message: format!("failed to read config file: {e}"),
    })?;
    parse_seed(&contents)
}

/// Extract the `seed` section from a full config document.
pub fn parse_seed(yaml: &str) -> Result<SeedConfig, EngineError> {
    if yaml.trim().is_empty() {
        return Ok(SeedConfig::default());
    }
    let raw: serde_yml::Value = serde_yml::from_str(yaml).map_err(|e| EngineError::Seed {
        message: format!("failed to parse config YAML: {e}"),
    })?;
    match raw.get("seed") {
        Some(section) => serde_yml::from_value(section.clone()).map_err(|e| EngineError::Seed {
            message: format!("failed to parse seed section: {e}"),
        }),
        None => Ok(SeedConfig::default()),
    }
}

/// Insert the seeded monsters and players. Returns `(monsters, players)`.
pub fn populate(store: &InMemoryStore, seed: SeedConfig, now: DateTime<Utc>) -> (usize, usize) {
    let monsters = seed.monsters.len();
    let players = seed.players.len();
    for monster in seed.monsters {
        store.insert_monster(monster.into_monster());
    }
    for player in seed.players {
        store.insert_player(player.into_player(now));
    }
    (monsters, players)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use ironvale_core::PlayerRepository;

    use super::*;

    const DOC: &str = "
pvp:
  protection_minutes: 15
seed:
  monsters:
    - name: Cave Rat
      level: 1
      health: 10
      damage_min: 1
      damage_max: 3
      experience_reward: 25
      gold_reward: 5
  players:
    - name: Aldric
      level: 8
    - name: Brenna
";

    #[test]
    fn seed_section_is_read_alongside_rules() {
        let seed = parse_seed(DOC).unwrap();
        assert_eq!(seed.monsters.len(), 1);
        assert_eq!(seed.monsters[0].gem_drop_rate, Decimal::new(5, 2));
        assert_eq!(seed.monsters[0].defense, 0);
        assert_eq!(seed.players.len(), 2);
        assert_eq!(seed.players[1].level, 1);
        assert_eq!(seed.players[1].gold, 100);
    }

    #[test]
    fn missing_section_is_empty() {
        let seed = parse_seed("pvp:\n  attack_cost: 1\n").unwrap();
        assert!(seed.monsters.is_empty());
        assert!(seed.players.is_empty());
        assert!(parse_seed("").unwrap().players.is_empty());
    }

    #[test]
    fn malformed_section_is_an_error() {
        let err = parse_seed("seed:\n  monsters: 3\n").unwrap_err();
        assert!(matches!(err, EngineError::Seed { .. }));
    }

    #[test]
    fn seeded_players_start_full() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let (monsters, players) = populate(&store, parse_seed(DOC).unwrap(), now);
        assert_eq!((monsters, players), (1, 2));
        assert_eq!(store.player_count(), 2);

        let ids = store.player_ids().unwrap();
        let aldric = ids
            .iter()
            .filter_map(|id| store.player(*id).unwrap())
            .find(|p| p.name == "Aldric")
            .unwrap();
        assert_eq!(aldric.health, max_hp(8));
        assert_eq!(aldric.mana.mana, max_mana(8));
        assert_eq!(aldric.mana.pvp_mana, 5);
        assert_eq!(aldric.mana.last_mana_regen, now);
    }
}
