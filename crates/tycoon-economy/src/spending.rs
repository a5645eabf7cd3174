//! Shop purchases and withdrawal requests.
//!
//! Both operations debit the balance and reject, never clamp, when the
//! balance would go negative.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;
use tycoon_types::{BoostType, InventoryItem, UserStatistics};

use crate::constants::MIN_WITHDRAWAL;
use crate::error::{EconomyError, PurchaseError, WithdrawalError};

/// Buy a catalog item.
///
/// The price is always debited. Only [`BoostType::Energy`] has an effect:
/// energy rises by `boost_value`, capped at `max_energy`. `Earning` and
/// `Xp` items are debited and otherwise inert.
pub fn apply_purchase(
    stats: &UserStatistics,
    item: &InventoryItem,
) -> Result<UserStatistics, PurchaseError> {
    if stats.balance < item.price {
        return Err(PurchaseError::InsufficientFunds {
            balance: stats.balance,
            price: item.price,
        });
    }

    let mut next = stats.clone();
    next.balance = stats
        .balance
        .checked_sub(item.price)
        .ok_or_else(|| overflow("purchase debit"))?;

    if item.boost_type == BoostType::Energy {
        next.energy = stats
            .energy
            .checked_add(item.boost_value)
            .ok_or_else(|| overflow("energy boost"))?
            .min(stats.max_energy);
    }

    info!(
        item = %item.id,
        price = %item.price,
        balance = %next.balance,
        "purchase applied"
    );
    Ok(next)
}

/// An accepted withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Statistics after the debit.
    pub stats: UserStatistics,
    /// The parsed amount that was debited.
    pub amount: Decimal,
}

/// Debit a withdrawal request.
///
/// Checks run in order: the amount parses and meets [`MIN_WITHDRAWAL`],
/// the amount is covered by the balance, the account is not blank. The
/// request itself is not recorded anywhere.
pub fn apply_withdrawal(
    stats: &UserStatistics,
    amount_text: &str,
    account_text: &str,
) -> Result<Withdrawal, WithdrawalError> {
    let amount = parse_amount(amount_text)
        .filter(|amount| *amount >= MIN_WITHDRAWAL)
        .ok_or_else(|| WithdrawalError::InvalidAmount {
            input: amount_text.to_owned(),
            minimum: MIN_WITHDRAWAL,
        })?;

    if amount > stats.balance {
        return Err(WithdrawalError::InsufficientFunds {
            requested: amount,
            balance: stats.balance,
        });
    }

    if account_text.trim().is_empty() {
        return Err(WithdrawalError::MissingAccount);
    }

    let mut next = stats.clone();
    next.balance = stats
        .balance
        .checked_sub(amount)
        .ok_or_else(|| overflow("withdrawal debit"))?;

    info!(amount = %amount, balance = %next.balance, "withdrawal applied");
    Ok(Withdrawal {
        stats: next,
        amount,
    })
}

/// Parse a user-entered amount.
///
/// Surrounding whitespace is ignored. Plain decimals (`"128"`, `"128.50"`)
/// and scientific notation (`"1.28e2"`) are accepted; anything else,
/// including trailing garbage such as `"128abc"`, is rejected.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn overflow(context: &str) -> EconomyError {
    EconomyError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use tycoon_types::ReferralCode;

    use super::*;
    use crate::catalog::find_item;
    use crate::progression::initial_statistics;

    fn stats() -> UserStatistics {
        initial_statistics(ReferralCode::generate())
    }

    #[test]
    fn energy_drink_refills_up_to_max() {
        let mut s = stats();
        s.energy = dec!(70);
        let drink = find_item("energy-drink").unwrap();
        let after = apply_purchase(&s, drink).unwrap();
        assert_eq!(after.balance, dec!(100));
        assert_eq!(after.energy, dec!(100));
    }

    #[test]
    fn energy_drink_from_low_energy() {
        let mut s = stats();
        s.energy = dec!(-5);
        let after = apply_purchase(&s, find_item("energy-drink").unwrap()).unwrap();
        assert_eq!(after.energy, dec!(45));
    }

    #[test]
    fn inert_boosts_only_debit() {
        let mut s = stats();
        s.balance = dec!(600);
        s.energy = dec!(40);
        let after = apply_purchase(&s, find_item("brain-booster").unwrap()).unwrap();
        assert_eq!(after.balance, dec!(100));
        assert_eq!(after.energy, dec!(40));
        assert_eq!(after.experience, s.experience);
    }

    #[test]
    fn purchase_at_exact_balance_succeeds() {
        let mut s = stats();
        s.balance = dec!(100);
        let after = apply_purchase(&s, find_item("energy-drink").unwrap()).unwrap();
        assert_eq!(after.balance, Decimal::ZERO);
    }

    #[test]
    fn purchase_rejected_when_broke() {
        let s = stats();
        let err = apply_purchase(&s, find_item("super-cpu").unwrap()).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                balance: dec!(200),
                price: dec!(2000),
            }
        );
    }

    #[test]
    fn withdrawal_checks_amount_before_funds_before_account() {
        let mut s = stats();
        s.balance = dec!(100);

        // Below minimum wins even though funds and account are also bad.
        assert!(matches!(
            apply_withdrawal(&s, "50", ""),
            Err(WithdrawalError::InvalidAmount { .. })
        ));
        // Funds win over a blank account.
        assert!(matches!(
            apply_withdrawal(&s, "150", "  "),
            Err(WithdrawalError::InsufficientFunds { .. })
        ));
        s.balance = dec!(200);
        assert_eq!(
            apply_withdrawal(&s, "150", " \t"),
            Err(WithdrawalError::MissingAccount)
        );
    }

    #[test]
    fn withdrawal_rejects_unparseable_amounts() {
        let s = stats();
        for input in ["", "   ", "abc", "128abc", "NaN"] {
            assert!(
                matches!(
                    apply_withdrawal(&s, input, "01700000000"),
                    Err(WithdrawalError::InvalidAmount { .. })
                ),
                "input {input:?} should be invalid"
            );
        }
    }

    #[test]
    fn withdrawal_accepts_fractional_and_padded_amounts() {
        let s = stats();
        let done = apply_withdrawal(&s, " 128.5 ", "01700000000").unwrap();
        assert_eq!(done.amount, dec!(128.5));
        assert_eq!(done.stats.balance, dec!(71.5));
    }

    #[test]
    fn parse_amount_variants() {
        assert_eq!(parse_amount("128"), Some(dec!(128)));
        assert_eq!(parse_amount("1.28e2"), Some(dec!(128)));
        assert_eq!(parse_amount("-200"), Some(dec!(-200)));
        assert_eq!(parse_amount("twelve"), None);
    }
}
