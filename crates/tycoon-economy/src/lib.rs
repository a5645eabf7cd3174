//! Economy engine for the Tycoon earning game.
//!
//! Every operation is a pure transformation of a
//! [`UserStatistics`](tycoon_types::UserStatistics) record: it borrows the
//! current record and returns a new one (or a typed rejection). The
//! session layer holds the only mutable handle and replaces its record
//! with whatever these functions return.
//!
//! # Modules
//!
//! - [`constants`] -- Balance constants (limits, minimums, curve factor)
//! - [`catalog`] -- The static shop catalog
//! - [`progression`] -- Task rewards, leveling, energy, gating predicates
//! - [`spending`] -- Purchases and withdrawals
//! - [`error`] -- Typed rejections

pub mod catalog;
pub mod constants;
pub mod error;
pub mod progression;
pub mod spending;

pub use catalog::{catalog, find_item};
pub use constants::{
    DAILY_TASK_LIMIT, ENERGY_REGEN_PER_TICK, FAILURE_ENERGY_PENALTY, MIN_WITHDRAWAL,
    REFERRAL_BONUS,
};
pub use error::{EconomyError, PurchaseError, WithdrawalError};
pub use progression::{
    apply_referral_confirmed, apply_task_failure, apply_task_success, can_attempt_task,
    daily_limit_reached, initial_statistics, level_progress_percent, referral_earnings,
    regenerate_energy, xp_for_reward,
};
pub use spending::{Withdrawal, apply_purchase, apply_withdrawal, parse_amount};
