//! Durable storage for transactions and the credential record.
//!
//! The store knows nothing about taxonomies or balances. It owns the schema,
//! assigns ids and dates, and runs every call inside its own database
//! transaction so a failed call leaves nothing behind.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use tokio::sync::OnceCell;

use crate::{
    LedgerError, NewTransaction, ResultLedger, Transaction,
    credentials::{self, CREDENTIAL_ID, validate_pin},
    transactions::{self, ensure_positive, normalize_date},
};

/// Run a block inside a DB transaction, committing on success. Dropping the
/// transaction on error rolls it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Progress of the one-time initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug)]
pub struct LedgerStore {
    database: DatabaseConnection,
    default_pin: String,
    init: OnceCell<()>,
    initializing: AtomicBool,
}

impl LedgerStore {
    /// Wraps an open connection. Nothing touches the database until
    /// [`initialize`](Self::initialize) or the first operation.
    pub fn new(database: DatabaseConnection, default_pin: impl Into<String>) -> ResultLedger<Self> {
        let default_pin = default_pin.into();
        validate_pin(&default_pin)?;
        Ok(Self {
            database,
            default_pin,
            init: OnceCell::new(),
            initializing: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> InitState {
        if self.init.initialized() {
            InitState::Ready
        } else if self.initializing.load(Ordering::Acquire) {
            InitState::Initializing
        } else {
            InitState::Uninitialized
        }
    }

    pub fn default_pin(&self) -> &str {
        &self.default_pin
    }

    /// Creates the schema and seeds the credential row. Runs at most once;
    /// concurrent callers wait for the same run. A failed run can be retried.
    pub async fn initialize(&self) -> ResultLedger<()> {
        self.init
            .get_or_try_init(|| async {
                self.initializing.store(true, Ordering::Release);
                let result = self.bootstrap().await;
                self.initializing.store(false, Ordering::Release);
                result
            })
            .await?;
        Ok(())
    }

    async fn bootstrap(&self) -> ResultLedger<()> {
        Migrator::up(&self.database, None).await?;
        with_tx!(self, |db_tx| {
            let existing = credentials::Entity::find_by_id(CREDENTIAL_ID)
                .one(&db_tx)
                .await?;
            if existing.is_none() {
                credentials::ActiveModel {
                    id: ActiveValue::Set(CREDENTIAL_ID),
                    pin: ActiveValue::Set(self.default_pin.clone()),
                }
                .insert(&db_tx)
                .await?;
                tracing::info!("seeded default credential");
            }
            Ok::<(), LedgerError>(())
        })?;
        tracing::info!("ledger store ready");
        Ok(())
    }

    /// Persists a new transaction and returns the stored record.
    pub async fn create(&self, input: &NewTransaction) -> ResultLedger<Transaction> {
        ensure_positive(input.amount)?;
        self.initialize().await?;

        let date = normalize_date(input.date.unwrap_or_else(Utc::now));
        let model = with_tx!(self, |db_tx| {
            transactions::ActiveModel::from_new(input, date)
                .insert(&db_tx)
                .await
                .map_err(LedgerError::from)
        })?;
        let tx = Transaction::try_from(model)?;
        tracing::debug!(id = tx.id, kind = %tx.kind, amount = %tx.amount, "transaction stored");
        Ok(tx)
    }

    /// Up to `limit` transactions, newest first (`date DESC, id DESC`).
    pub async fn list(&self, limit: u64) -> ResultLedger<Vec<Transaction>> {
        self.initialize().await?;
        // SQLite binds LIMIT as a signed 64-bit integer.
        let limit = limit.min(i64::MAX.unsigned_abs());
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Every transaction, newest first.
    pub async fn list_all(&self) -> ResultLedger<Vec<Transaction>> {
        self.initialize().await?;
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn find(&self, id: i64) -> ResultLedger<Transaction> {
        self.initialize().await?;
        let model = transactions::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound(format!("transaction {id}")))?;
        Transaction::try_from(model)
    }

    pub async fn count(&self) -> ResultLedger<u64> {
        self.initialize().await?;
        Ok(transactions::Entity::find().count(&self.database).await?)
    }

    /// Removes one transaction. Unknown ids are not an error.
    pub async fn delete_one(&self, id: i64) -> ResultLedger<()> {
        self.initialize().await?;
        let result = with_tx!(self, |db_tx| {
            transactions::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(LedgerError::from)
        })?;
        tracing::debug!(id, removed = result.rows_affected, "transaction delete");
        Ok(())
    }

    pub async fn delete_all(&self) -> ResultLedger<()> {
        self.initialize().await?;
        let result = with_tx!(self, |db_tx| {
            transactions::Entity::delete_many()
                .exec(&db_tx)
                .await
                .map_err(LedgerError::from)
        })?;
        tracing::info!(removed = result.rows_affected, "all transactions deleted");
        Ok(())
    }

    pub async fn credential(&self) -> ResultLedger<String> {
        self.initialize().await?;
        credentials::Entity::find_by_id(CREDENTIAL_ID)
            .one(&self.database)
            .await?
            .map(|model| model.pin)
            .ok_or_else(|| LedgerError::CorruptRecord("credential row missing".to_string()))
    }

    pub async fn set_credential(&self, pin: &str) -> ResultLedger<()> {
        validate_pin(pin)?;
        self.initialize().await?;
        with_tx!(self, |db_tx| overwrite_pin(&db_tx, pin).await)?;
        tracing::info!("credential changed");
        Ok(())
    }

    pub async fn reset_credential(&self) -> ResultLedger<()> {
        self.initialize().await?;
        with_tx!(self, |db_tx| overwrite_pin(&db_tx, &self.default_pin).await)?;
        tracing::info!("credential reset to default");
        Ok(())
    }

    /// Deletes every transaction and resets the credential, atomically.
    pub async fn reset_all(&self) -> ResultLedger<()> {
        self.initialize().await?;
        with_tx!(self, |db_tx| {
            match transactions::Entity::delete_many().exec(&db_tx).await {
                Ok(_) => overwrite_pin(&db_tx, &self.default_pin).await,
                Err(err) => Err(LedgerError::from(err)),
            }
        })?;
        tracing::info!("ledger data reset");
        Ok(())
    }
}

async fn overwrite_pin<C: ConnectionTrait>(db: &C, pin: &str) -> ResultLedger<()> {
    credentials::ActiveModel {
        id: ActiveValue::Unchanged(CREDENTIAL_ID),
        pin: ActiveValue::Set(pin.to_string()),
    }
    .update(db)
    .await?;
    Ok(())
}
