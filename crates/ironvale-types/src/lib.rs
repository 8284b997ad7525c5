//! Shared type definitions for the Ironvale game core.
//!
//! This crate is the single source of truth for the records exchanged
//! between the rules engine, the regeneration scheduler, and the external
//! storage and web layers. Types flow to `TypeScript` via `ts-rs` for the
//! browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for players, monsters, and items
//! - [`enums`] -- Stats, combat sides, resources, and rejection reasons
//! - [`structs`] -- Snapshots, combat results, mana state, deltas, audit records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Combatant, RejectionReason, Stat, UnknownStat};
pub use ids::{ItemId, MonsterId, PlayerId};
pub use structs::{
    AuditRecord, CombatLogEntry, CombatResult, CombatantSnapshot, EquipmentItem,
    EquipmentModifiers, ManaRestore, ManaState, Monster, Player, PlayerDelta, Progression,
    PvpManaRegen, PvpProtection, RegenUpdate, Rewards, StatGains, StatTotals, Wealth,
    default_gem_drop_rate,
};

#[cfg(test)]
mod tests {
    //! Triggers `TypeScript` binding generation for every exported type.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::MonsterId::export_all();
        let _ = crate::ids::ItemId::export_all();

        // Enums
        let _ = crate::enums::Stat::export_all();
        let _ = crate::enums::Combatant::export_all();
        let _ = crate::enums::RejectionReason::export_all();

        // Structs
        let _ = crate::structs::CombatantSnapshot::export_all();
        let _ = crate::structs::EquipmentModifiers::export_all();
        let _ = crate::structs::EquipmentItem::export_all();
        let _ = crate::structs::Monster::export_all();
        let _ = crate::structs::CombatLogEntry::export_all();
        let _ = crate::structs::Rewards::export_all();
        let _ = crate::structs::CombatResult::export_all();
        let _ = crate::structs::Wealth::export_all();
        let _ = crate::structs::PvpProtection::export_all();
        let _ = crate::structs::StatTotals::export_all();
        let _ = crate::structs::StatGains::export_all();
        let _ = crate::structs::ManaState::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::Progression::export_all();
        let _ = crate::structs::RegenUpdate::export_all();
        let _ = crate::structs::ManaRestore::export_all();
        let _ = crate::structs::PvpManaRegen::export_all();
        let _ = crate::structs::PlayerDelta::export_all();
        let _ = crate::structs::AuditRecord::export_all();
    }
}
