use chrono::{DateTime, TimeZone};

use crate::{
    Bucket, CategoryTotal, PeriodTotal, ResultLedger, Taxonomy, TransactionKind, Window,
    aggregate_by_category, aggregate_by_period, filter_by_type, filter_by_window,
};

use super::Ledger;

impl Ledger {
    /// Per category totals of `kind` transactions inside `window`, in
    /// `taxonomy` order. Categories without transactions are left out, and so
    /// are transactions whose category is missing from `taxonomy`.
    pub async fn get_statistics<Tz: TimeZone>(
        &self,
        kind: TransactionKind,
        window: Window,
        taxonomy: &Taxonomy,
        now: &DateTime<Tz>,
    ) -> ResultLedger<Vec<CategoryTotal>> {
        let transactions = {
            let _guard = self.lock.read().await;
            self.store.list_all().await?
        };
        let of_kind = filter_by_type(&transactions, kind);
        let in_window = filter_by_window(&of_kind, window, now);
        let totals = aggregate_by_category(&in_window, taxonomy);
        tracing::debug!(%kind, ?window, slices = totals.len(), "statistics computed");
        Ok(totals)
    }

    /// Income and expense per day, week, month or year in `tz`, oldest first.
    pub async fn period_totals<Tz: TimeZone>(
        &self,
        bucket: Bucket,
        tz: &Tz,
    ) -> ResultLedger<Vec<PeriodTotal>> {
        let transactions = {
            let _guard = self.lock.read().await;
            self.store.list_all().await?
        };
        Ok(aggregate_by_period(&transactions, bucket, tz))
    }
}
