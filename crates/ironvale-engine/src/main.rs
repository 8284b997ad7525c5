//! Engine binary for the Ironvale game core.
//!
//! Hosts the parts of the core that run on their own: it loads the
//! configuration, seeds the in-memory world, and keeps the regeneration
//! scheduler running until the process is asked to stop. Request handling
//! lives in the web layer, which drives `GameService` directly.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ironvale-config.yaml` (or `IRONVALE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the store from the `seed` section
//! 4. Start the regeneration scheduler (runs a catch-up pass first)
//! 5. Wait for Ctrl-C, then stop the scheduler

mod error;
mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use ironvale_core::{
    Clock, GameConfig, InMemoryStore, LogFormat, LoggingConfig, PlayerRepository, RegenScheduler,
    SystemClock,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "IRONVALE_CONFIG";

/// Config file used when `IRONVALE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "ironvale-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or scheduler startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so it comes first.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config = %config_path.display(),
        protection_minutes = config.pvp.protection_minutes,
        mana_interval_hours = config.regen.rules.mana_interval_hours,
        pvp_sweep_seconds = config.regen.pvp_sweep_seconds,
        "ironvale-engine starting"
    );

    // 3. Seed the world.
    let store = Arc::new(InMemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let seed = seed::load_seed(&config_path)?;
    let (monsters, players) = seed::populate(&store, seed, clock.now());
    info!(monsters, players, "World seeded");

    // 4. Start regeneration.
    let scheduler = RegenScheduler::new(
        Arc::clone(&store) as Arc<dyn PlayerRepository>,
        Arc::clone(&clock),
        config.regen.clone(),
    );
    scheduler.start().map_err(EngineError::from)?;
    info!("Regeneration scheduler running, press Ctrl-C to stop");

    // 5. Run until interrupted.
    tokio::signal::ctrl_c().await.map_err(EngineError::from)?;
    info!("Shutdown requested");
    scheduler.shutdown().await;

    info!(
        players = store.player_count(),
        "ironvale-engine shutdown complete"
    );
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the game configuration, falling back to defaults when the file is
/// missing.
fn load_config(path: &std::path::Path) -> Result<GameConfig, EngineError> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        // Nothing is logged yet; defaults still honor IRONVALE_LOG.
        Ok(GameConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| EnvFilter::new(logging.level.as_str()));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
