use crate::{NewTransaction, ResultLedger, Transaction};

use super::{DEFAULT_LIST_LIMIT, Ledger};

impl Ledger {
    /// Validates `input` and stores it.
    ///
    /// Amount must be positive and the category must belong to the taxonomy
    /// of the input's kind. Rejected input never reaches the store.
    pub async fn add_transaction(&self, input: NewTransaction) -> ResultLedger<Transaction> {
        if let Err(err) = self.validate_input(&input) {
            tracing::warn!("rejected transaction: {err}");
            return Err(err);
        }
        let _guard = self.lock.write().await;
        self.store.create(&input).await
    }

    /// Newest first, at most `limit` (default [`DEFAULT_LIST_LIMIT`]). Any
    /// limit above the stored count returns everything.
    pub async fn list_transactions(&self, limit: Option<u64>) -> ResultLedger<Vec<Transaction>> {
        let _guard = self.lock.read().await;
        self.store.list(limit.unwrap_or(DEFAULT_LIST_LIMIT)).await
    }

    /// Every transaction, newest first. Used by exports.
    pub async fn list_all_transactions(&self) -> ResultLedger<Vec<Transaction>> {
        let _guard = self.lock.read().await;
        self.store.list_all().await
    }

    /// Number of stored transactions.
    pub async fn count(&self) -> ResultLedger<u64> {
        let _guard = self.lock.read().await;
        self.store.count().await
    }

    /// Fails with [`LedgerError::KeyNotFound`](crate::LedgerError::KeyNotFound)
    /// for unknown ids.
    pub async fn transaction(&self, id: i64) -> ResultLedger<Transaction> {
        let _guard = self.lock.read().await;
        self.store.find(id).await
    }

    /// Idempotent: unknown ids succeed and change nothing.
    pub async fn delete_transaction(&self, id: i64) -> ResultLedger<()> {
        let _guard = self.lock.write().await;
        self.store.delete_one(id).await
    }

    pub async fn delete_all_transactions(&self) -> ResultLedger<()> {
        let _guard = self.lock.write().await;
        self.store.delete_all().await
    }

    /// Deletes all data: every transaction goes and the PIN returns to its
    /// default. The credential row itself stays.
    pub async fn reset_all(&self) -> ResultLedger<()> {
        let _guard = self.lock.write().await;
        self.store.reset_all().await
    }
}
