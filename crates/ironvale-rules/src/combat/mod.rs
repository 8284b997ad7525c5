//! Combat resolution.
//!
//! # Modules
//!
//! - [`pve`] -- Player-versus-monster fights, round by round to the finish
//! - [`pvp`] -- Single player-versus-player blows and kill theft
//! - [`targeting`] -- PvP target eligibility and protection windows

pub mod pve;
pub mod pvp;
pub mod targeting;
