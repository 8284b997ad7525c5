//! The regeneration scheduler.
//!
//! A single background task that keeps every player's mana pools topped up:
//!
//! - a full mana restore on each mana boundary (every 6 hours from UTC
//!   midnight by default)
//! - PvP mana catch-up on a short sweep interval (5 minutes by default)
//!
//! Each pass walks every player, asks [`ironvale_rules::regen::plan_regen`]
//! what is owed, and writes it. A player whose write fails is logged and
//! skipped; the pass continues.
//!
//! # Lifecycle
//!
//! [`RegenScheduler::start`] runs a catch-up pass synchronously, then spawns
//! the timer task. Starting an already running scheduler does nothing.
//! [`RegenScheduler::stop`] cancels the pending timer; a pass that is
//! already running finishes first, since passes never yield.
//!
//! The lifecycle lock is held for the whole of `start`, so a `stop` issued
//! mid-catch-up waits and then stops the task that `start` spawned. Passes
//! are serialized by a second lock, so a stopping task's last pass never
//! overlaps a new catch-up. [`RegenScheduler::shutdown`] waits for every
//! task that has been stopped, not only the latest one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ironvale_rules::regen::{next_boundary, plan_regen};
use ironvale_types::PlayerDelta;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::RegenConfig;
use crate::store::{PlayerRepository, StoreError};

/// Errors that can occur when starting or running the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The player list could not be read.
    #[error("failed to list players: {source}")]
    Store {
        /// The underlying storage error.
        #[from]
        source: StoreError,
    },

    /// `start` was called outside a tokio runtime.
    #[error("the regeneration scheduler needs a running tokio runtime")]
    NoRuntime,
}

/// What one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Players looked at.
    pub examined: usize,
    /// Players given a full mana restore.
    pub mana_restored: usize,
    /// Players given PvP mana.
    pub pvp_mana_updated: usize,
    /// Players whose write failed.
    pub failed: usize,
}

struct RunHandle {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Timer tasks owned by the scheduler.
#[derive(Default)]
struct Lifecycle {
    /// The task currently ticking, if any.
    active: Option<RunHandle>,
    /// Tasks told to stop that nobody has awaited yet.
    stopping: Vec<JoinHandle<()>>,
}

struct Shared {
    players: Arc<dyn PlayerRepository>,
    clock: Arc<dyn Clock>,
    config: RegenConfig,
    pass: Mutex<()>,
}

impl Shared {
    fn run_pass(&self) -> Result<PassSummary, SchedulerError> {
        let _pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let mut summary = PassSummary::default();

        for id in self.players.player_ids()? {
            summary.examined = summary.examined.saturating_add(1);
            let player = match self.players.player(id) {
                Ok(Some(p)) => p,
                Ok(None) => continue,
                Err(e) => {
                    warn!(player_id = %id, error = %e, "Skipping player: read failed");
                    summary.failed = summary.failed.saturating_add(1);
                    continue;
                }
            };
            let Some(update) = plan_regen(&player, now, &self.config.rules) else {
                continue;
            };

            let restored = update.mana_restore.is_some();
            let pvp = update.pvp_mana.is_some();
            let delta = PlayerDelta {
                regen: Some(update),
                ..PlayerDelta::default()
            };
            match self.players.apply_delta(id, &delta) {
                Ok(_) => {
                    if restored {
                        summary.mana_restored = summary.mana_restored.saturating_add(1);
                    }
                    if pvp {
                        summary.pvp_mana_updated = summary.pvp_mana_updated.saturating_add(1);
                    }
                }
                Err(e) => {
                    warn!(player_id = %id, error = %e, "Skipping player: regen write failed");
                    summary.failed = summary.failed.saturating_add(1);
                }
            }
        }

        info!(
            examined = summary.examined,
            mana_restored = summary.mana_restored,
            pvp_mana_updated = summary.pvp_mana_updated,
            failed = summary.failed,
            "Regeneration pass complete"
        );
        Ok(summary)
    }

    /// Time until the next pass: the next mana boundary or the sweep
    /// interval, whichever comes first.
    fn next_wait(&self) -> Duration {
        let sweep = self.config.sweep_interval();
        let now = self.clock.now();
        let boundary = next_boundary(now, self.config.rules.mana_interval());
        boundary
            .signed_duration_since(now)
            .to_std()
            .map_or(sweep, |until_boundary| until_boundary.min(sweep))
    }
}

/// Periodic mana and PvP mana regeneration.
pub struct RegenScheduler {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for RegenScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let running = self
            .lifecycle
            .try_lock()
            .map(|lifecycle| lifecycle.active.is_some())
            .ok();
        f.debug_struct("RegenScheduler")
            .field("config", &self.shared.config)
            .field("running", &running)
            .finish_non_exhaustive()
    }
}

impl RegenScheduler {
    /// Create a stopped scheduler.
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        clock: Arc<dyn Clock>,
        config: RegenConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                players,
                clock,
                config,
                pass: Mutex::new(()),
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the timer task is active.
    ///
    /// Blocks while a `start` is still catching up.
    pub fn is_running(&self) -> bool {
        self.lifecycle().active.is_some()
    }

    /// Apply whatever regeneration was missed while the scheduler was down.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if the player list cannot be read.
    pub fn catch_up(&self) -> Result<PassSummary, SchedulerError> {
        info!("Regeneration catch-up starting");
        self.shared.run_pass()
    }

    /// Run one pass now.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if the player list cannot be read.
    pub fn run_pass(&self) -> Result<PassSummary, SchedulerError> {
        self.shared.run_pass()
    }

    /// Catch up, then start the timer task.
    ///
    /// Returns `Ok(false)` without doing anything if already running.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoRuntime`] outside a tokio runtime, or
    /// [`SchedulerError::Store`] if the catch-up cannot list players. The
    /// scheduler is left stopped in both cases.
    pub fn start(&self) -> Result<bool, SchedulerError> {
        let mut lifecycle = self.lifecycle();
        if lifecycle.active.is_some() {
            debug!("Regeneration scheduler already running");
            return Ok(false);
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_err| SchedulerError::NoRuntime)?;
        self.catch_up()?;

        let stop = Arc::new(Notify::new());
        let task = runtime.spawn(run_loop(Arc::clone(&self.shared), Arc::clone(&stop)));
        lifecycle.active = Some(RunHandle { stop, task });
        drop(lifecycle);

        info!(
            mana_interval_hours = self.shared.config.rules.mana_interval_hours,
            pvp_sweep_seconds = self.shared.config.pvp_sweep_seconds,
            "Regeneration scheduler started"
        );
        Ok(true)
    }

    /// Cancel the pending timer. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        let Some(handle) = lifecycle.active.take() else {
            return false;
        };
        handle.stop.notify_one();
        lifecycle.stopping.retain(|task| !task.is_finished());
        lifecycle.stopping.push(handle.task);
        drop(lifecycle);
        info!("Regeneration scheduler stopping");
        true
    }

    /// Stop and wait for every timer task to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let tasks = std::mem::take(&mut self.lifecycle().stopping);
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Regeneration task ended abnormally");
            }
        }
    }
}

async fn run_loop(shared: Arc<Shared>, stop: Arc<Notify>) {
    loop {
        let wait = shared.next_wait();
        debug!(wait_secs = wait.as_secs(), "Next regeneration pass scheduled");
        tokio::select! {
            () = stop.notified() => break,
            () = tokio::time::sleep(wait) => {
                if let Err(e) = shared.run_pass() {
                    warn!(error = %e, "Regeneration pass failed");
                }
            }
        }
    }
    info!("Regeneration scheduler stopped");
}
