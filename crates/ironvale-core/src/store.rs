//! Storage seams and an in-memory implementation.
//!
//! The core never owns persistence. It reaches players, monsters, PvP
//! protection records, and the audit log through the narrow synchronous
//! traits below; each call is assumed atomic for one record. Two
//! implementations ship with the crate:
//!
//! - [`InMemoryStore`] implements every trait over `RwLock`ed maps. Tests
//!   and the engine binary use it.
//! - [`JsonLinesSink`] writes audit records as one JSON object per line to
//!   any writer.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, PoisonError, RwLock};

use ironvale_rules::derive_modifiers;
use ironvale_types::{
    AuditRecord, EquipmentItem, EquipmentModifiers, Monster, MonsterId, Player, PlayerDelta,
    PlayerId, PvpProtection,
};

/// Errors raised by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write targeted a player that does not exist.
    #[error("player {player_id} not found")]
    PlayerNotFound {
        /// The missing player.
        player_id: PlayerId,
    },

    /// The backing store cannot serve the request.
    #[error("storage unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// An audit record could not be encoded.
    #[error("failed to encode audit record: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// An audit record could not be written.
    #[error("failed to write audit record: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Reads and updates player records.
pub trait PlayerRepository: Send + Sync {
    /// Fetch one player.
    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;

    /// Every player id, for scheduler sweeps.
    fn player_ids(&self) -> Result<Vec<PlayerId>, StoreError>;

    /// Cached combat modifiers for what the player wears. A player with no
    /// equipment gets [`EquipmentModifiers::default`].
    fn equipment_modifiers(&self, id: PlayerId) -> Result<EquipmentModifiers, StoreError>;

    /// Apply a delta and return the updated record.
    fn apply_delta(&self, id: PlayerId, delta: &PlayerDelta) -> Result<Player, StoreError>;
}

/// Reads monster definitions.
pub trait MonsterRepository: Send + Sync {
    /// Fetch one monster.
    fn monster(&self, id: MonsterId) -> Result<Option<Monster>, StoreError>;
}

/// Reads and writes PvP protection windows.
pub trait ProtectionStore: Send + Sync {
    /// The current protection record for a player, expired or not.
    fn protection(&self, player_id: PlayerId) -> Result<Option<PvpProtection>, StoreError>;

    /// Store (replace) a protection record.
    fn set_protection(&self, record: PvpProtection) -> Result<(), StoreError>;

    /// Every stored protection record, keyed by player.
    fn protections(&self) -> Result<HashMap<PlayerId, PvpProtection>, StoreError>;
}

/// Append-only audit log.
pub trait LogSink: Send + Sync {
    /// Append one record.
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Delta application
// ---------------------------------------------------------------------------

fn add_clamped(value: u32, delta: i64, max: u32) -> u32 {
    let next = i64::from(value).saturating_add(delta).clamp(0, i64::from(max));
    u32::try_from(next).unwrap_or(max)
}

fn add_unbounded(value: u64, delta: i64) -> u64 {
    if delta.is_negative() {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta.unsigned_abs())
    }
}

/// Apply `delta` to `player` in place.
///
/// Absolute fields land first (progression, then regeneration), then the
/// additive changes, with every pool clamped to its bounds.
pub fn apply_delta_to(player: &mut Player, delta: &PlayerDelta) {
    if let Some(progression) = delta.progression {
        player.level = progression.level;
        player.experience = progression.experience;
        player.max_health = progression.max_health;
    }
    if let Some(regen) = &delta.regen {
        if let Some(restore) = regen.mana_restore {
            player.mana.mana = restore.mana;
            player.mana.max_mana = restore.max_mana;
            player.mana.last_mana_regen = restore.at;
        }
        if let Some(pvp) = regen.pvp_mana {
            player.mana.pvp_mana = pvp.pvp_mana;
            player.mana.last_pvp_mana_regen = pvp.at;
        }
    }

    player.health = add_clamped(player.health, delta.health, player.max_health);
    player.mana.mana = add_clamped(player.mana.mana, delta.mana, player.mana.max_mana);
    player.mana.pvp_mana = add_clamped(player.mana.pvp_mana, delta.pvp_mana, u32::MAX);
    player.wealth.gold = add_unbounded(player.wealth.gold, delta.gold);
    player.wealth.gems = add_unbounded(player.wealth.gems, delta.gems);
    player.wealth.metals = add_unbounded(player.wealth.metals, delta.metals);
    player.stats.apply(&delta.stat_gains);
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Every storage trait over in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    players: RwLock<HashMap<PlayerId, Player>>,
    equipment: RwLock<HashMap<PlayerId, Vec<EquipmentItem>>>,
    monsters: RwLock<HashMap<MonsterId, Monster>>,
    protections: RwLock<HashMap<PlayerId, PvpProtection>>,
    audit: RwLock<Vec<AuditRecord>>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player.
    pub fn insert_player(&self, player: Player) {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player.id, player);
    }

    /// Insert or replace a monster.
    pub fn insert_monster(&self, monster: Monster) {
        self.monsters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(monster.id, monster);
    }

    /// Replace what a player wears.
    pub fn equip(&self, player_id: PlayerId, items: Vec<EquipmentItem>) {
        self.equipment
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player_id, items);
    }

    /// A copy of every audit record written so far.
    pub fn audit_log(&self) -> Vec<AuditRecord> {
        self.audit
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of stored players.
    pub fn player_count(&self) -> usize {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl PlayerRepository for InMemoryStore {
    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned())
    }

    fn player_ids(&self) -> Result<Vec<PlayerId>, StoreError> {
        let mut ids: Vec<PlayerId> = self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn equipment_modifiers(&self, id: PlayerId) -> Result<EquipmentModifiers, StoreError> {
        let Some(player) = self.player(id)? else {
            return Ok(EquipmentModifiers::default());
        };
        let equipment = self.equipment.read().unwrap_or_else(PoisonError::into_inner);
        Ok(equipment.get(&id).map_or_else(EquipmentModifiers::default, |items| {
            derive_modifiers(items, player.stats.speed)
        }))
    }

    fn apply_delta(&self, id: PlayerId, delta: &PlayerDelta) -> Result<Player, StoreError> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let player = players
            .get_mut(&id)
            .ok_or(StoreError::PlayerNotFound { player_id: id })?;
        apply_delta_to(player, delta);
        Ok(player.clone())
    }
}

impl MonsterRepository for InMemoryStore {
    fn monster(&self, id: MonsterId) -> Result<Option<Monster>, StoreError> {
        Ok(self
            .monsters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned())
    }
}

impl ProtectionStore for InMemoryStore {
    fn protection(&self, player_id: PlayerId) -> Result<Option<PvpProtection>, StoreError> {
        Ok(self
            .protections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player_id)
            .cloned())
    }

    fn set_protection(&self, record: PvpProtection) -> Result<(), StoreError> {
        self.protections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.player_id, record);
        Ok(())
    }

    fn protections(&self) -> Result<HashMap<PlayerId, PvpProtection>, StoreError> {
        Ok(self
            .protections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl LogSink for InMemoryStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.audit
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON lines sink
// ---------------------------------------------------------------------------

/// Writes each audit record as a single JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogSink for JsonLinesSink<W> {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
