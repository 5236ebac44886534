//! Derived views over a transaction list: window and type filters, per
//! category totals, monthly summary and time buckets.
//!
//! Everything here is pure and recomputed on each call. Calendar questions
//! ("today", "this week") are answered in the timezone of the `now` argument.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, Money, ResultLedger, Taxonomy, Transaction, TransactionKind};

/// Time range used to filter transactions before aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// Same calendar date as now.
    Day,
    /// The Sunday to Saturday week containing now.
    Week,
    Month,
    Year,
    All,
    /// Inclusive on both ends. A missing bound means no filtering at all.
    Custom {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl Window {
    /// Custom range, rejecting `start > end`.
    pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultLedger<Self> {
        if start > end {
            return Err(LedgerError::InvalidWindow(
                "range start must not be after its end".to_string(),
            ));
        }
        Ok(Self::Custom {
            start: Some(start),
            end: Some(end),
        })
    }

    /// Whether `date` falls in the window evaluated at `now`.
    pub fn contains<Tz: TimeZone>(&self, date: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let local = date.with_timezone(&now.timezone()).date_naive();
        let today = now.date_naive();
        match *self {
            Window::Day => local == today,
            Window::Week => {
                let start = week_start(today);
                local >= start && local <= start + Duration::days(6)
            }
            Window::Month => local.year() == today.year() && local.month() == today.month(),
            Window::Year => local.year() == today.year(),
            Window::All => true,
            Window::Custom {
                start: Some(start),
                end: Some(end),
            } => start <= date && date <= end,
            Window::Custom { .. } => true,
        }
    }
}

impl FromStr for Window {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(LedgerError::InvalidWindow(format!("unknown window: {other}"))),
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn filter_by_window<Tz: TimeZone>(
    transactions: &[Transaction],
    window: Window,
    now: &DateTime<Tz>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| window.contains(tx.date, now))
        .cloned()
        .collect()
}

pub fn filter_by_type(transactions: &[Transaction], kind: TransactionKind) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.kind == kind)
        .cloned()
        .collect()
}

/// Total amount for one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

impl CategoryTotal {
    /// Percentage of `grand_total` this slice represents. Display only.
    pub fn share(&self, grand_total: Money) -> f64 {
        if grand_total.is_zero() {
            return 0.0;
        }
        self.total.minor() as f64 * 100.0 / grand_total.minor() as f64
    }
}

/// Sums amounts per taxonomy key, in taxonomy order, skipping empty
/// categories. Transactions whose category is not in `taxonomy` are dropped.
pub fn aggregate_by_category(
    transactions: &[Transaction],
    taxonomy: &Taxonomy,
) -> Vec<CategoryTotal> {
    taxonomy
        .keys()
        .filter_map(|key| {
            let total: Money = transactions
                .iter()
                .filter(|tx| tx.category == key)
                .map(|tx| tx.amount)
                .sum();
            total.is_positive().then(|| CategoryTotal {
                category: key.to_string(),
                total,
            })
        })
        .collect()
}

/// Sum of all slices, the denominator for [`CategoryTotal::share`].
pub fn grand_total(totals: &[CategoryTotal]) -> Money {
    totals.iter().map(|t| t.total).sum()
}

/// Dashboard summary for the current calendar month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub income: Money,
    pub expense: Money,
    /// `initial_balance + income − expense`.
    pub savings: Money,
}

pub fn monthly_summary<Tz: TimeZone>(
    transactions: &[Transaction],
    initial_balance: Money,
    now: &DateTime<Tz>,
) -> MonthlySummary {
    let this_month = filter_by_window(transactions, Window::Month, now);
    let income: Money = filter_by_type(&this_month, TransactionKind::Income)
        .iter()
        .map(|tx| tx.amount)
        .sum();
    let expense: Money = filter_by_type(&this_month, TransactionKind::Expense)
        .iter()
        .map(|tx| tx.amount)
        .sum();
    let savings = Money::saturating_from_wide(
        i128::from(initial_balance.minor()) + i128::from(income.minor())
            - i128::from(expense.minor()),
    );
    MonthlySummary {
        income,
        expense,
        savings,
    }
}

/// Granularity of [`aggregate_by_period`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Day,
    /// Weeks start on Sunday.
    Week,
    Month,
    Year,
}

impl Bucket {
    fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Week => week_start(date),
            Bucket::Month => date.with_day(1).unwrap_or(date),
            Bucket::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// First local calendar day of the bucket.
    pub start: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

/// Income and expense sums per bucket, oldest first. Only buckets with at
/// least one transaction are returned.
pub fn aggregate_by_period<Tz: TimeZone>(
    transactions: &[Transaction],
    bucket: Bucket,
    tz: &Tz,
) -> Vec<PeriodTotal> {
    let mut buckets: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
    for tx in transactions {
        let local = tx.date.with_timezone(tz).date_naive();
        let entry = buckets.entry(bucket.start_of(local)).or_default();
        let sums = match tx.kind {
            TransactionKind::Income => &mut entry.0,
            TransactionKind::Expense => &mut entry.1,
        };
        *sums = [*sums, tx.amount].iter().sum();
    }
    buckets
        .into_iter()
        .map(|(start, (income, expense))| PeriodTotal {
            start,
            income,
            expense,
        })
        .collect()
}
