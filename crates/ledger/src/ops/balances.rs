use chrono::{DateTime, TimeZone};

use crate::{Money, MonthlySummary, ResultLedger, Totals, compute_balance, monthly_summary};

use super::Ledger;

impl Ledger {
    /// Current balance: `initial_balance` plus the signed sum of every
    /// stored transaction.
    ///
    /// The initial balance comes from onboarding and is not stored here.
    pub async fn get_balance(&self, initial_balance: Money) -> ResultLedger<Money> {
        let _guard = self.lock.read().await;
        let transactions = self.store.list_all().await?;
        Ok(compute_balance(initial_balance, &transactions))
    }

    /// All-time income and expense.
    pub async fn totals(&self) -> ResultLedger<Totals> {
        let _guard = self.lock.read().await;
        let transactions = self.store.list_all().await?;
        Ok(Totals::of(&transactions))
    }

    pub async fn monthly_summary<Tz: TimeZone>(
        &self,
        initial_balance: Money,
        now: &DateTime<Tz>,
    ) -> ResultLedger<MonthlySummary> {
        let _guard = self.lock.read().await;
        let transactions = self.store.list_all().await?;
        Ok(monthly_summary(&transactions, initial_balance, now))
    }
}
