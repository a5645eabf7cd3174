//! Shared type definitions for the Tycoon earning game.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the browser frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Task identifiers and the session referral code
//! - [`enums`] -- Boost types, task kinds, payment methods, view modes
//! - [`structs`] -- Statistics record, tasks, shop items, withdrawal receipts

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BoostType, NotificationKind, PaymentMethod, TaskKind, ViewMode};
pub use ids::{REFERRAL_CODE_PREFIX, ReferralCode, TaskId};
pub use structs::{InventoryItem, Task, UserStatistics, WithdrawalReceipt};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings into `bindings/` relative to the crate
        // root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::ids::TaskId::export_all();
        let _ = crate::ids::ReferralCode::export_all();

        let _ = crate::enums::BoostType::export_all();
        let _ = crate::enums::TaskKind::export_all();
        let _ = crate::enums::PaymentMethod::export_all();
        let _ = crate::enums::ViewMode::export_all();
        let _ = crate::enums::NotificationKind::export_all();

        let _ = crate::structs::UserStatistics::export_all();
        let _ = crate::structs::Task::export_all();
        let _ = crate::structs::InventoryItem::export_all();
        let _ = crate::structs::WithdrawalReceipt::export_all();
    }
}
