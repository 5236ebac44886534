//! Balance derivation.
//!
//! The balance is never stored: it is a fold over the ledger plus an initial
//! offset owned by the caller (onboarding).

use serde::{Deserialize, Serialize};

use crate::{Money, Transaction, TransactionKind};

/// `initial + Σ income − Σ expense`.
///
/// Exact and independent of the order of `transactions`; an empty slice
/// yields `initial`.
pub fn compute_balance(initial: Money, transactions: &[Transaction]) -> Money {
    let delta: i128 = transactions
        .iter()
        .map(|tx| i128::from(tx.signed_amount().minor()))
        .sum();
    Money::saturating_from_wide(i128::from(initial.minor()) + delta)
}

/// Income and expense sums over a transaction set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
}

impl Totals {
    pub fn of(transactions: &[Transaction]) -> Self {
        let (income, expense) =
            transactions
                .iter()
                .fold((0i128, 0i128), |(income, expense), tx| match tx.kind {
                    TransactionKind::Income => (income + i128::from(tx.amount.minor()), expense),
                    TransactionKind::Expense => (income, expense + i128::from(tx.amount.minor())),
                });
        Self {
            income: Money::saturating_from_wide(income),
            expense: Money::saturating_from_wide(expense),
        }
    }

    /// `income − expense`.
    pub fn net(&self) -> Money {
        Money::saturating_from_wide(
            i128::from(self.income.minor()) - i128::from(self.expense.minor()),
        )
    }
}
