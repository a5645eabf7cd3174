//! Errors raised by session operations.
//!
//! Every variant is recoverable. The session records each one as a
//! notification before returning it, so a client that ignores the error
//! still shows the player what happened.

use rust_decimal::Decimal;
use tycoon_economy::{EconomyError, MIN_WITHDRAWAL, PurchaseError, WithdrawalError};
use tycoon_types::{NotificationKind, TaskId};

/// A rejected session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The player does not have enough energy for the task.
    #[error("insufficient energy: have {energy}, task needs {required}")]
    InsufficientEnergy {
        /// Current energy.
        energy: Decimal,
        /// Energy cost of the task.
        required: Decimal,
    },

    /// Today's task limit is used up.
    #[error("daily task limit of {limit} reached")]
    DailyLimitReached {
        /// The limit.
        limit: u32,
    },

    /// No task is open for answering.
    #[error("no active task")]
    NoActiveTask,

    /// The task id is not in the current batch.
    #[error("task {0} is not in the current batch")]
    TaskNotFound(TaskId),

    /// The submitted answer is blank.
    #[error("answer is empty")]
    EmptyAnswer,

    /// An answer is already being verified.
    #[error("an answer is already being verified")]
    VerificationInProgress,

    /// The task was replaced while its answer was being verified.
    #[error("task was replaced while the answer was being checked")]
    StaleTask,

    /// The shop has no item with this key.
    #[error("unknown shop item: {0}")]
    UnknownItem(String),

    /// The purchase was rejected.
    #[error(transparent)]
    Purchase(#[from] PurchaseError),

    /// The withdrawal was rejected.
    #[error(transparent)]
    Withdrawal(#[from] WithdrawalError),

    /// Economy arithmetic failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}

impl SessionError {
    /// Text shown to the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientEnergy { .. } => "You don't have enough energy!".to_owned(),
            Self::DailyLimitReached { limit } => {
                format!("You have reached today's limit ({limit})!")
            }
            Self::NoActiveTask => "Pick a task first.".to_owned(),
            Self::TaskNotFound(_) => "That task is no longer available.".to_owned(),
            Self::EmptyAnswer => "Type an answer first.".to_owned(),
            Self::VerificationInProgress => "Your answer is still being checked.".to_owned(),
            Self::StaleTask => "That task was replaced before your answer was checked.".to_owned(),
            Self::UnknownItem(_) => "That item is not in the shop.".to_owned(),
            Self::Purchase(PurchaseError::InsufficientFunds { .. }) => {
                "You don't have enough money!".to_owned()
            }
            Self::Withdrawal(WithdrawalError::InvalidAmount { .. }) => {
                format!("The minimum withdrawal is {MIN_WITHDRAWAL}.")
            }
            Self::Withdrawal(WithdrawalError::InsufficientFunds { .. }) => {
                "Your balance is not enough!".to_owned()
            }
            Self::Withdrawal(WithdrawalError::MissingAccount) => {
                "Please enter an account number.".to_owned()
            }
            Self::Purchase(PurchaseError::Economy(_))
            | Self::Withdrawal(WithdrawalError::Economy(_))
            | Self::Economy(_) => "Something went wrong. Please try again.".to_owned(),
        }
    }

    /// Severity of the notification raised for this error.
    pub const fn notification_kind(&self) -> NotificationKind {
        match self {
            Self::DailyLimitReached { .. } | Self::StaleTask | Self::VerificationInProgress => {
                NotificationKind::Info
            }
            _ => NotificationKind::Error,
        }
    }
}
