//! Core records: statistics, tasks, shop items, withdrawal receipts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BoostType, PaymentMethod, TaskKind};
use crate::ids::{ReferralCode, TaskId};

// ---------------------------------------------------------------------------
// UserStatistics
// ---------------------------------------------------------------------------

/// The single session-long statistics record.
///
/// Owned by the session and only ever replaced with the output of an
/// economy operation. Invariants restored by every operation:
///
/// - `energy <= max_energy` (energy may go below zero after failed
///   attempts; this is preserved behavior, not a bug)
/// - `experience < next_level_exp` after a single level-up carry, unless
///   one reward crossed two thresholds
/// - `balance >= 0` for purchases and withdrawals
/// - `daily_tasks_done <= DAILY_TASK_LIMIT` when callers respect the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserStatistics {
    /// Spendable currency.
    #[ts(as = "String")]
    pub balance: Decimal,
    /// Current energy.
    #[ts(as = "String")]
    pub energy: Decimal,
    /// Energy ceiling.
    #[ts(as = "String")]
    pub max_energy: Decimal,
    /// Player level, starting at 1.
    pub level: u32,
    /// Experience accumulated toward the next level.
    #[ts(as = "String")]
    pub experience: Decimal,
    /// Experience needed to reach the next level.
    #[ts(as = "String")]
    pub next_level_exp: Decimal,
    /// Referral code assigned at session start.
    pub referral_code: ReferralCode,
    /// Confirmed referrals.
    pub referrals_count: u32,
    /// Tasks completed today.
    pub daily_tasks_done: u32,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A single task offered by the content provider.
///
/// Ephemeral: lives until it is completed or the batch is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    /// Locally assigned identifier, unique within the batch.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Challenge text.
    pub description: String,
    /// Currency granted on a correct answer.
    #[ts(as = "String")]
    pub reward: Decimal,
    /// Energy consumed on a correct answer.
    #[ts(as = "String")]
    pub energy_cost: Decimal,
    /// Descriptive difficulty label.
    pub difficulty: String,
    /// Descriptive category.
    pub kind: TaskKind,
    /// Expected answer. `None` means any answer is accepted.
    pub answer: Option<String>,
}

impl Task {
    /// The expected answer, treating an empty string the same as none.
    pub fn expected_answer(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.is_empty())
    }
}

// ---------------------------------------------------------------------------
// InventoryItem
// ---------------------------------------------------------------------------

/// A static shop catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Stable catalog key (e.g. `energy-drink`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Purchase price.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Effect category.
    pub boost_type: BoostType,
    /// Effect magnitude (energy points, or a multiplier for inert boosts).
    #[ts(as = "String")]
    pub boost_value: Decimal,
    /// Icon name for the presentation layer.
    pub icon: String,
}

// ---------------------------------------------------------------------------
// WithdrawalReceipt
// ---------------------------------------------------------------------------

/// Acknowledgment returned for an accepted withdrawal.
///
/// Never persisted. The balance debit is the only lasting effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WithdrawalReceipt {
    /// Amount debited.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Destination account as entered (trimmed).
    pub account: String,
    /// Chosen payout channel.
    pub method: PaymentMethod,
    /// When the request was accepted.
    pub requested_at: DateTime<Utc>,
}
