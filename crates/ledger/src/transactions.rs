//! Transaction primitives.
//!
//! A `Transaction` is an immutable income or expense record. Its amount is
//! always positive; the kind decides the sign of its balance contribution.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, Money, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidKind(other.to_string())),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.trim())
    }
}

/// A persisted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned, strictly increasing, never reused.
    pub id: i64,
    pub amount: Money,
    pub description: Option<String>,
    pub category: String,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Contribution to the balance: `+amount` for income, `-amount` for expense.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Caller input for a new transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Money,
    pub description: Option<String>,
    pub category: String,
    pub kind: TransactionKind,
    /// Defaults to the creation time.
    pub date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, amount: Money, category: impl Into<String>) -> Self {
        Self {
            amount,
            description: None,
            category: category.into(),
            kind,
            date: None,
        }
    }

    pub fn income(amount: Money, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Income, amount, category)
    }

    pub fn expense(amount: Money, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Expense, amount, category)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Dates are kept at millisecond precision so stored and returned values agree.
pub(crate) fn normalize_date(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(3)
}

pub(crate) fn ensure_positive(amount: Money) -> ResultLedger<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be > 0, got {amount}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub category: String,
    pub date: DateTimeUtc,
    #[sea_orm(column_name = "type")]
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_new(tx: &NewTransaction, date: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            date: ActiveValue::Set(date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TransactionKind::try_from(model.kind.as_str()).map_err(|_| {
            LedgerError::CorruptRecord(format!(
                "transaction {} has type {}",
                model.id, model.kind
            ))
        })?;
        if model.amount_minor <= 0 {
            return Err(LedgerError::CorruptRecord(format!(
                "transaction {} has non-positive amount",
                model.id
            )));
        }
        Ok(Self {
            id: model.id,
            amount: Money::new(model.amount_minor),
            description: model.description,
            category: model.category,
            kind,
            date: model.date,
        })
    }
}
