//! Player actions: fighting monsters, attacking players, and praying.
//!
//! [`GameService`] is the glue between the pure rules and the storage
//! collaborators. Each action follows the same shape:
//!
//! 1. Load the records it needs.
//! 2. Check preconditions; a failure is a [`Rejection`] and nothing is
//!    written.
//! 3. Run the resolver from `ironvale-rules`.
//! 4. Persist the resulting [`PlayerDelta`]s (and PvP protection).
//! 5. Append an [`AuditRecord`]. A failing log sink is logged and ignored;
//!    the action has already happened.

use std::sync::Arc;

use ironvale_rules::combat::pvp::PvpOutcome;
use ironvale_rules::{
    CombatRules, DistributionStrategy, EquipmentSetValidation, PrayerOutcome, PrayerRules,
    PvpAttack, PvpRules, Rejection, TargetProfile, apply_experience, calculate_stat_gains,
    eligible_targets, new_protection, parse_mana_amount, parse_stat, resolve_pve, resolve_pvp,
    validate_equipment_set, validate_target,
};
use ironvale_types::{
    AuditRecord, CombatResult, EquipmentItem, MonsterId, Player, PlayerDelta, PlayerId,
    PvpProtection, RejectionReason,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::store::{
    InMemoryStore, LogSink, MonsterRepository, PlayerRepository, ProtectionStore, StoreError,
};

/// Errors returned by [`GameService`] actions.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The action was refused; nothing was written.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A storage collaborator failed.
    #[error("storage error: {source}")]
    Store {
        /// The underlying storage error.
        #[from]
        source: StoreError,
    },
}

impl GameError {
    /// The rejection code, if this is a rejection.
    pub const fn reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected(rejection) => Some(rejection.reason()),
            Self::Store { .. } => None,
        }
    }
}

/// The storage and time collaborators a [`GameService`] works against.
#[derive(Clone)]
pub struct Collaborators {
    /// Player reads and writes.
    pub players: Arc<dyn PlayerRepository>,
    /// Monster reads.
    pub monsters: Arc<dyn MonsterRepository>,
    /// PvP protection windows.
    pub protections: Arc<dyn ProtectionStore>,
    /// Audit log.
    pub log: Arc<dyn LogSink>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Use one in-memory store for every storage role.
    pub fn in_memory(store: &Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            players: Arc::clone(store) as Arc<dyn PlayerRepository>,
            monsters: Arc::clone(store) as Arc<dyn MonsterRepository>,
            protections: Arc::clone(store) as Arc<dyn ProtectionStore>,
            log: Arc::clone(store) as Arc<dyn LogSink>,
            clock,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Outcome of [`GameService::fight_monster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightReport {
    /// The full fight result.
    pub result: CombatResult,
    /// The player after the fight was persisted.
    pub player: Player,
    /// Whether the rewards carried the player to a new level.
    pub leveled_up: bool,
}

/// Outcome of [`GameService::attack_player`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    /// The resolved blow.
    pub outcome: PvpOutcome,
    /// The attacker after the attack was persisted.
    pub attacker: Player,
    /// The defender after the attack was persisted.
    pub defender: Player,
    /// The protection window now covering the defender.
    pub protection: PvpProtection,
}

/// Outcome of [`GameService::pray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerReport {
    /// What the prayer yielded.
    pub outcome: PrayerOutcome,
    /// The player after the prayer was persisted.
    pub player: Player,
}

/// Executes player actions against the storage collaborators.
#[derive(Debug, Clone)]
pub struct GameService {
    deps: Collaborators,
    combat: CombatRules,
    pvp: PvpRules,
    prayer: PrayerRules,
}

impl GameService {
    /// Create a service with the rule sections of `config`.
    pub fn new(deps: Collaborators, config: &GameConfig) -> Self {
        Self {
            deps,
            combat: config.combat.clone(),
            pvp: config.pvp.clone(),
            prayer: config.prayer.clone(),
        }
    }

    fn load_player(&self, id: PlayerId) -> Result<Player, GameError> {
        self.deps
            .players
            .player(id)?
            .ok_or(GameError::Rejected(Rejection::PlayerNotFound))
    }

    fn record(&self, record: &AuditRecord) {
        if let Err(e) = self.deps.log.append(record) {
            warn!(error = %e, "Failed to append audit record");
        }
    }

    // -----------------------------------------------------------------------
    // PvE
    // -----------------------------------------------------------------------

    /// Fight a monster to the finish.
    ///
    /// Costs `combat.fight_mana_cost` mana. The player's health after the
    /// fight is persisted whatever the outcome; rewards and level-ups only on
    /// a win.
    ///
    /// # Errors
    ///
    /// Rejects a missing player or monster, a player with no health, or one
    /// without enough mana. Storage failures surface as [`GameError::Store`].
    pub fn fight_monster(
        &self,
        player_id: PlayerId,
        monster_id: MonsterId,
        rng: &mut impl Rng,
    ) -> Result<FightReport, GameError> {
        let player = self.load_player(player_id)?;
        let monster = self
            .deps
            .monsters
            .monster(monster_id)?
            .ok_or(Rejection::MonsterNotFound)?;

        if player.health == 0 {
            return Err(Rejection::InsufficientHealth.into());
        }
        let cost = self.combat.fight_mana_cost;
        if player.mana.mana < cost {
            return Err(Rejection::InsufficientMana {
                required: cost,
                available: player.mana.mana,
            }
            .into());
        }

        let equipment = self.deps.players.equipment_modifiers(player_id)?;
        let result = resolve_pve(&player.combatant(), &equipment, &monster, rng);

        let mut delta = PlayerDelta {
            health: i64::from(result.final_attacker_hp).saturating_sub(i64::from(player.health)),
            mana: i64::from(cost).saturating_neg(),
            ..PlayerDelta::default()
        };
        let mut leveled_up = false;
        if let Some(rewards) = &result.rewards {
            delta.gold = i64::try_from(rewards.gold).unwrap_or(i64::MAX);
            delta.gems = i64::try_from(rewards.gems).unwrap_or(i64::MAX);
            let progression = apply_experience(player.level, player.experience, rewards.experience);
            leveled_up = progression.level > player.level;
            delta.progression = Some(progression);
        }

        let updated = self.deps.players.apply_delta(player_id, &delta)?;
        let at = self.deps.clock.now();
        self.record(&AuditRecord::PveFight {
            player_id,
            monster_id,
            result: result.clone(),
            at,
        });

        info!(
            player_id = %player_id,
            monster = %monster.name,
            won = result.player_won(),
            rounds = result.rounds,
            leveled_up,
            "Monster fight resolved"
        );

        Ok(FightReport {
            result,
            player: updated,
            leveled_up,
        })
    }

    // -----------------------------------------------------------------------
    // PvP
    // -----------------------------------------------------------------------

    /// Attack another player once.
    ///
    /// Target eligibility is checked before anything else touches the
    /// attacker's resources. On success the attacker pays the PvP mana cost,
    /// the defender takes the damage (and loses resources on a kill), and the
    /// defender is protected for `pvp.protection_minutes`.
    ///
    /// # Errors
    ///
    /// Rejects per the target rules, then for missing PvP mana or health.
    /// Storage failures surface as [`GameError::Store`].
    pub fn attack_player(
        &self,
        attacker_id: PlayerId,
        defender_id: PlayerId,
        rng: &mut impl Rng,
    ) -> Result<AttackReport, GameError> {
        let attacker = self.load_player(attacker_id)?;
        let defender = self.deps.players.player(defender_id)?;
        let protection = self.deps.protections.protection(defender_id)?;
        let now = self.deps.clock.now();

        let defender_profile = defender.as_ref().map(TargetProfile::from);
        validate_target(
            &TargetProfile::from(&attacker),
            defender_profile.as_ref(),
            protection.as_ref(),
            now,
            &self.pvp,
        )?;
        let defender = defender.ok_or(Rejection::TargetNotFound)?;

        if attacker.mana.pvp_mana < self.pvp.attack_cost {
            return Err(Rejection::InsufficientPvpMana {
                available: attacker.mana.pvp_mana,
            }
            .into());
        }
        if attacker.health == 0 {
            return Err(Rejection::InsufficientHealth.into());
        }

        let attacker_equipment = self.deps.players.equipment_modifiers(attacker_id)?;
        let defender_equipment = self.deps.players.equipment_modifiers(defender_id)?;
        let attacker_snapshot = attacker.combatant();
        let defender_snapshot = defender.combatant();
        let outcome = resolve_pvp(
            &PvpAttack {
                attacker: &attacker_snapshot,
                attacker_equipment: &attacker_equipment,
                defender: &defender_snapshot,
                defender_equipment: &defender_equipment,
                defender_wealth: &defender.wealth,
            },
            &self.pvp.theft,
            rng,
        );

        let stolen = &outcome.stolen;
        let defender_delta = PlayerDelta {
            health: i64::from(outcome.defender_health_after)
                .saturating_sub(i64::from(defender.health)),
            gold: signed(stolen.gold).saturating_neg(),
            gems: signed(stolen.gems).saturating_neg(),
            metals: signed(stolen.metals).saturating_neg(),
            ..PlayerDelta::default()
        };
        let attacker_delta = PlayerDelta {
            pvp_mana: i64::from(self.pvp.attack_cost).saturating_neg(),
            gold: signed(stolen.gold),
            gems: signed(stolen.gems),
            metals: signed(stolen.metals),
            ..PlayerDelta::default()
        };

        let defender_after = self.deps.players.apply_delta(defender_id, &defender_delta)?;
        let attacker_after = self.deps.players.apply_delta(attacker_id, &attacker_delta)?;
        let protection = new_protection(defender_id, attacker_id, now, &self.pvp);
        self.deps.protections.set_protection(protection.clone())?;

        self.record(&AuditRecord::PvpAttack {
            attacker_id,
            defender_id,
            damage: outcome.damage,
            is_kill: outcome.is_kill,
            stolen: outcome.stolen,
            at: now,
        });

        info!(
            attacker_id = %attacker_id,
            defender_id = %defender_id,
            damage = outcome.damage,
            is_kill = outcome.is_kill,
            robbed = !outcome.stolen.is_empty(),
            "PvP attack resolved"
        );

        Ok(AttackReport {
            outcome,
            attacker: attacker_after,
            defender: defender_after,
            protection,
        })
    }

    /// Players the attacker may hit right now, in id order.
    ///
    /// # Errors
    ///
    /// Rejects a missing attacker; storage failures surface as
    /// [`GameError::Store`].
    pub fn list_targets(&self, attacker_id: PlayerId) -> Result<Vec<Player>, GameError> {
        let attacker = self.load_player(attacker_id)?;
        let mut players = Vec::new();
        for id in self.deps.players.player_ids()? {
            if let Some(p) = self.deps.players.player(id)? {
                players.push(p);
            }
        }
        let profiles: Vec<TargetProfile> = players.iter().map(TargetProfile::from).collect();
        let protections = self.deps.protections.protections()?;
        let now = self.deps.clock.now();

        let eligible: Vec<PlayerId> = eligible_targets(
            &TargetProfile::from(&attacker),
            &profiles,
            &protections,
            now,
            &self.pvp,
        )
        .into_iter()
        .map(|t| t.id)
        .collect();
        debug!(attacker_id = %attacker_id, count = eligible.len(), "Listed PvP targets");

        Ok(players
            .into_iter()
            .filter(|p| eligible.contains(&p.id))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Prayer
    // -----------------------------------------------------------------------

    /// Offer mana at the temple.
    ///
    /// `mana` is what the player typed: a number, or `all` / `max`. `stat`
    /// names a single stat to train; without one, points are spread at
    /// random. The whole offered amount is charged even when truncation
    /// makes part of it count for nothing.
    ///
    /// # Errors
    ///
    /// Rejects a missing player, a malformed amount, an amount below one
    /// mana unit, an unknown stat, or more mana than the player has.
    pub fn pray(
        &self,
        player_id: PlayerId,
        mana: &str,
        stat: Option<&str>,
        rng: &mut impl Rng,
    ) -> Result<PrayerReport, GameError> {
        let player = self.load_player(player_id)?;
        let available = player.mana.mana;
        let requested = parse_mana_amount(mana, available)?;
        if requested < self.prayer.mana_unit {
            return Err(Rejection::ManaBelowMinimum {
                minimum: self.prayer.mana_unit,
                requested,
            }
            .into());
        }
        if requested > available {
            return Err(Rejection::InsufficientMana {
                required: requested,
                available,
            }
            .into());
        }
        let strategy = match stat {
            Some(name) => DistributionStrategy::SingleTarget(parse_stat(name)?),
            None => DistributionStrategy::Weighted3Way,
        };

        let outcome = calculate_stat_gains(&player.stats, requested, strategy, &self.prayer, rng);
        let delta = PlayerDelta {
            mana: i64::from(requested).saturating_neg(),
            stat_gains: outcome.gains.clone(),
            ..PlayerDelta::default()
        };
        let updated = self.deps.players.apply_delta(player_id, &delta)?;

        self.record(&AuditRecord::Prayer {
            player_id,
            mana_spent: outcome.mana_spent,
            effective_mana: outcome.effective_mana,
            gains: outcome.gains.clone(),
            at: self.deps.clock.now(),
        });

        info!(
            player_id = %player_id,
            mana_spent = outcome.mana_spent,
            points = outcome.points,
            gained = %outcome.gains.total(),
            "Prayer resolved"
        );

        Ok(PrayerReport {
            outcome,
            player: updated,
        })
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    /// Check a prospective set of items against the player without
    /// equipping or charging anything.
    ///
    /// # Errors
    ///
    /// Rejects a missing player.
    pub fn preview_equipment(
        &self,
        player_id: PlayerId,
        items: &[EquipmentItem],
    ) -> Result<EquipmentSetValidation, GameError> {
        let player = self.load_player(player_id)?;
        Ok(validate_equipment_set(&player, items))
    }
}

fn signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}
