use sea_orm::{DatabaseConnection, DbErr};
use tokio::sync::RwLock;

use crate::{
    DEFAULT_PIN, InitState, LedgerError, LedgerStore, NewTransaction, ResultLedger, Taxonomy,
    TransactionKind,
};

mod balances;
mod credentials;
mod statistics;
mod transactions;

/// Default page size of [`Ledger::list_transactions`].
pub const DEFAULT_LIST_LIMIT: u64 = 100;

/// The public entry point of the ledger.
///
/// Mutations hold the write side of `lock` and reads hold the read side, so
/// a read never observes a half applied mutation and no two mutations
/// interleave.
#[derive(Debug)]
pub struct Ledger {
    store: LedgerStore,
    income: Taxonomy,
    expense: Taxonomy,
    lock: RwLock<()>,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Runs schema creation and credential seeding once. Every other
    /// operation waits for it, so calling it up front only moves the cost.
    pub async fn initialize(&self) -> ResultLedger<()> {
        self.store.initialize().await
    }

    pub fn state(&self) -> InitState {
        self.store.state()
    }

    /// Categories valid for `kind`.
    pub fn taxonomy(&self, kind: TransactionKind) -> &Taxonomy {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expense,
        }
    }

    fn validate_input(&self, input: &NewTransaction) -> ResultLedger<()> {
        if !input.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be > 0, got {}",
                input.amount
            )));
        }
        if !self.taxonomy(input.kind).contains(&input.category) {
            return Err(LedgerError::InvalidCategory(format!(
                "{} is not an {} category",
                input.category, input.kind
            )));
        }
        Ok(())
    }
}

/// The builder for `Ledger`
pub struct LedgerBuilder {
    database: DatabaseConnection,
    default_pin: String,
    income: Taxonomy,
    expense: Taxonomy,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            default_pin: DEFAULT_PIN.to_string(),
            income: Taxonomy::income(),
            expense: Taxonomy::expense(),
        }
    }
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// PIN seeded on first run and restored by resets.
    pub fn default_pin(mut self, pin: impl Into<String>) -> LedgerBuilder {
        self.default_pin = pin.into();
        self
    }

    /// Replace the built-in taxonomy for the taxonomy's kind.
    pub fn taxonomy(mut self, taxonomy: Taxonomy) -> LedgerBuilder {
        match taxonomy.kind() {
            TransactionKind::Income => self.income = taxonomy,
            TransactionKind::Expense => self.expense = taxonomy,
        }
        self
    }

    /// Construct `Ledger`. The database is not touched until initialization,
    /// but a builder without a connection is refused here.
    pub async fn build(self) -> ResultLedger<Ledger> {
        if matches!(self.database, DatabaseConnection::Disconnected) {
            return Err(LedgerError::Database(DbErr::Custom(
                "no database connection configured".to_string(),
            )));
        }
        self.income.ensure_disjoint(&self.expense)?;
        Ok(Ledger {
            store: LedgerStore::new(self.database, self.default_pin)?,
            income: self.income,
            expense: self.expense,
            lock: RwLock::new(()),
        })
    }
}
