//! Error types for the economy engine.
//!
//! Every operation that can reject its input returns a typed error rather
//! than clamping. Arithmetic is checked; overflow surfaces as
//! [`EconomyError::ArithmeticOverflow`] instead of a panic.

use rust_decimal::Decimal;

/// Arithmetic failure inside an economy operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// A checked operation overflowed.
    #[error("arithmetic overflow in economy computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

/// Rejection of a shop purchase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    /// The balance does not cover the item price.
    #[error("insufficient funds: balance {balance} is below price {price}")]
    InsufficientFunds {
        /// Balance at the time of the attempt.
        balance: Decimal,
        /// Price of the item.
        price: Decimal,
    },

    /// The purchase arithmetic failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}

/// Rejection of a withdrawal request.
///
/// Checks run in a fixed order: amount, then funds, then account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawalError {
    /// The amount is not a number or is below the minimum.
    #[error("invalid withdrawal amount {input:?}: minimum is {minimum}")]
    InvalidAmount {
        /// The text as entered.
        input: String,
        /// The minimum accepted amount.
        minimum: Decimal,
    },

    /// The amount exceeds the balance.
    #[error("insufficient funds: requested {requested}, balance {balance}")]
    InsufficientFunds {
        /// Parsed amount.
        requested: Decimal,
        /// Balance at the time of the attempt.
        balance: Decimal,
    },

    /// The destination account is blank.
    #[error("destination account is required")]
    MissingAccount,

    /// The withdrawal arithmetic failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}
