//! Enumeration types for the Tycoon game.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Shop boosts
// ---------------------------------------------------------------------------

/// The effect category of a shop item.
///
/// Only [`BoostType::Energy`] is wired to an effect. `Earning` and `Xp`
/// carry multipliers in the catalog that the reward computation ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BoostType {
    /// Refills energy by `boost_value`, capped at `max_energy`.
    Energy,
    /// Declared reward multiplier (inert).
    Earning,
    /// Declared experience multiplier (inert).
    #[serde(rename = "XP", alias = "Xp")]
    Xp,
}

// ---------------------------------------------------------------------------
// Task tags
// ---------------------------------------------------------------------------

/// Descriptive task category reported by the content provider.
///
/// Has no behavioral effect in the economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskKind {
    /// A riddle with a single expected answer.
    Riddle,
    /// An open-ended creative prompt, usually without an expected answer.
    Creative,
    /// An arithmetic or logic problem.
    Math,
    /// Anything the provider labelled differently.
    Other,
}

impl TaskKind {
    /// Map a free-form label to a kind, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "riddle" | "puzzle" => Self::Riddle,
            "creative" | "writing" => Self::Creative,
            "math" | "maths" | "arithmetic" => Self::Math,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Withdrawals
// ---------------------------------------------------------------------------

/// Payout channel chosen on the withdrawal form.
///
/// Purely informational: no payout integration exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PaymentMethod {
    /// bKash mobile wallet.
    #[default]
    Bkash,
    /// Nagad mobile wallet.
    Nagad,
    /// Binance account.
    Binance,
    /// TON wallet.
    Ton,
}

impl PaymentMethod {
    /// Every supported method in display order.
    pub const ALL: [Self; 4] = [Self::Bkash, Self::Nagad, Self::Binance, Self::Ton];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bkash => "bKash",
            Self::Nagad => "Nagad",
            Self::Binance => "Binance",
            Self::Ton => "TON Wallet",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Which screen the presentation layer is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ViewMode {
    /// Overview with balance, energy and level.
    #[default]
    Dashboard,
    /// Shop catalog.
    Shop,
    /// Current task batch.
    Tasks,
    /// Withdrawal form.
    Withdraw,
    /// Referral code and earnings.
    Referral,
}

/// Tone of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NotificationKind {
    /// Operation succeeded.
    Success,
    /// Operation was rejected or failed.
    Error,
    /// Neutral information (e.g. daily limit reached).
    Info,
}
