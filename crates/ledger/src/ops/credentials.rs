//! PIN access for the auth collaborator.

use crate::{LedgerError, ResultLedger, validate_pin};

use super::Ledger;

impl Ledger {
    pub async fn credential(&self) -> ResultLedger<String> {
        let _guard = self.lock.read().await;
        self.store.credential().await
    }

    /// `true` when `pin` matches the stored PIN.
    pub async fn verify_pin(&self, pin: &str) -> ResultLedger<bool> {
        Ok(self.credential().await? == pin)
    }

    /// Overwrites the PIN without checking the old one.
    pub async fn set_pin(&self, pin: &str) -> ResultLedger<()> {
        let _guard = self.lock.write().await;
        self.store.set_credential(pin).await
    }

    /// Changes the PIN. When `current` is given it must match the stored PIN.
    pub async fn change_pin(&self, new_pin: &str, current: Option<&str>) -> ResultLedger<()> {
        validate_pin(new_pin)?;
        let _guard = self.lock.write().await;
        if let Some(current) = current
            && self.store.credential().await? != current
        {
            tracing::warn!("PIN change refused: current PIN mismatch");
            return Err(LedgerError::InvalidPin("current PIN is incorrect".to_string()));
        }
        self.store.set_credential(new_pin).await
    }

    pub async fn reset_pin(&self) -> ResultLedger<()> {
        let _guard = self.lock.write().await;
        self.store.reset_credential().await
    }
}
