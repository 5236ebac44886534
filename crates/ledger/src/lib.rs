//! Transaction ledger and aggregation engine for the Finly finance tracker.
//!
//! - [`LedgerStore`] persists transactions and the single credential row.
//! - [`compute_balance`] derives the balance from the stored transactions.
//! - [`aggregation`] turns a transaction list into dashboard and chart data.
//! - [`Ledger`] is the facade callers use; it validates input, serializes
//!   mutations and composes the pieces above.

pub use aggregation::{
    Bucket, CategoryTotal, MonthlySummary, PeriodTotal, Window, aggregate_by_category,
    aggregate_by_period, filter_by_type, filter_by_window, grand_total, monthly_summary,
};
pub use balance::{Totals, compute_balance};
pub use categories::{Category, Taxonomy};
pub use credentials::{DEFAULT_PIN, validate_pin};
pub use error::{ErrorKind, LedgerError};
pub use money::Money;
pub use ops::{DEFAULT_LIST_LIMIT, Ledger, LedgerBuilder};
pub use store::{InitState, LedgerStore};
pub use transactions::{NewTransaction, Transaction, TransactionKind};

pub mod aggregation;
mod balance;
mod categories;
mod credentials;
mod error;
mod money;
mod ops;
mod store;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
