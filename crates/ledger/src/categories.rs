//! Category taxonomy.
//!
//! Income and expense categories are two disjoint, ordered sets of keys. The
//! declaration order is the order statistics are reported in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{LedgerError, ResultLedger, TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
}

impl Category {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

const EXPENSE_CATEGORIES: [(&str, &str); 8] = [
    ("transportation", "Transportation"),
    ("entertainment", "Entertainment"),
    ("bills", "Bills & Utilities"),
    ("health", "Health & Fitness"),
    ("shopping", "Shopping"),
    ("food", "Food & Drink"),
    ("education", "Education"),
    ("other_expense", "Other Expense"),
];

const INCOME_CATEGORIES: [(&str, &str); 8] = [
    ("salary", "Salary"),
    ("bonus", "Bonus"),
    ("freelance", "Freelance"),
    ("investment", "Investment"),
    ("business", "Business"),
    ("allowance", "Allowance"),
    ("cashback", "Cashback"),
    ("other_income", "Other Income"),
];

/// Ordered set of categories valid for one [`TransactionKind`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    kind: TransactionKind,
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Builds a taxonomy, rejecting empty and duplicate keys.
    pub fn new(kind: TransactionKind, categories: Vec<Category>) -> ResultLedger<Self> {
        let mut seen = HashSet::new();
        for category in &categories {
            if category.key.trim().is_empty() {
                return Err(LedgerError::InvalidTaxonomy(
                    "category key must not be empty".to_string(),
                ));
            }
            if !seen.insert(category.key.as_str()) {
                return Err(LedgerError::InvalidTaxonomy(format!(
                    "duplicate category key: {}",
                    category.key
                )));
            }
        }
        Ok(Self { kind, categories })
    }

    /// Built-in expense categories.
    pub fn expense() -> Self {
        Self::from_table(TransactionKind::Expense, &EXPENSE_CATEGORIES)
    }

    /// Built-in income categories.
    pub fn income() -> Self {
        Self::from_table(TransactionKind::Income, &INCOME_CATEGORIES)
    }

    pub fn for_kind(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::income(),
            TransactionKind::Expense => Self::expense(),
        }
    }

    fn from_table(kind: TransactionKind, table: &[(&str, &str)]) -> Self {
        Self {
            kind,
            categories: table
                .iter()
                .map(|(key, label)| Category::new(*key, *label))
                .collect(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().any(|k| k == key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.label.as_str())
    }

    /// Fails unless `self` and `other` share no key.
    pub(crate) fn ensure_disjoint(&self, other: &Taxonomy) -> ResultLedger<()> {
        if let Some(key) = self.keys().find(|k| other.contains(k)) {
            return Err(LedgerError::InvalidTaxonomy(format!(
                "category {key} is both {} and {}",
                self.kind.as_str(),
                other.kind.as_str()
            )));
        }
        Ok(())
    }
}
