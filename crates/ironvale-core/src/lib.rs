//! Game actions, storage seams, and regeneration for the Ironvale game core.
//!
//! This crate connects the pure rules in `ironvale-rules` to the outside
//! world: it loads configuration, reads and writes players through narrow
//! storage traits, stamps actions with an injectable clock, and runs the
//! background regeneration scheduler.
//!
//! # Modules
//!
//! - [`actions`] -- [`GameService`]: fight, attack, pray, list targets,
//!   preview equipment
//! - [`clock`] -- [`Clock`] trait with system and manual implementations
//! - [`config`] -- Configuration loading from `ironvale-config.yaml` into
//!   [`GameConfig`]
//! - [`scheduler`] -- [`RegenScheduler`]: mana restores and PvP mana sweeps
//! - [`store`] -- Storage traits, [`InMemoryStore`], and a JSON lines audit sink
//!
//! [`GameService`]: actions::GameService
//! [`Clock`]: clock::Clock
//! [`GameConfig`]: config::GameConfig
//! [`RegenScheduler`]: scheduler::RegenScheduler
//! [`InMemoryStore`]: store::InMemoryStore

pub mod actions;
pub mod clock;
pub mod config;
pub mod scheduler;
pub mod store;

pub use actions::{AttackReport, Collaborators, FightReport, GameError, GameService, PrayerReport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig, LogFormat, LoggingConfig, RegenConfig};
pub use scheduler::{PassSummary, RegenScheduler, SchedulerError};
pub use store::{
    InMemoryStore, JsonLinesSink, LogSink, MonsterRepository, PlayerRepository, ProtectionStore,
    StoreError,
};
