//! Ledger transactions: manual entries, invoice receipts, salary payouts.

use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt};
use paymate_core::export::to_csv;
use paymate_core::ledger::{filter_by_kind, LedgerSummary, Transaction, TransactionKind};
use tracing::info;

use crate::error::DbResult;
use crate::store::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct LedgerRepository {
    transactions: Collection<Transaction>,
}

impl LedgerRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        LedgerRepository {
            transactions: Collection::new(store),
        }
    }

    /// Records (or replaces, by id) a transaction.
    pub async fn add(&self, tx: &Transaction) -> DbResult<()> {
        info!(
            id = %tx.id,
            kind = ?tx.kind,
            amount = tx.amount,
            category = %tx.category,
            "Recording transaction"
        );
        self.transactions.put(tx).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        self.transactions.delete(id).await
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Transaction>> {
        self.transactions.list(owner_id).await
    }

    /// Entries of one kind, as the tracker's INCOME / EXPENSE tabs show them.
    pub async fn list_by_kind(
        &self,
        owner_id: &str,
        kind: TransactionKind,
    ) -> DbResult<Vec<Transaction>> {
        let all = self.list(owner_id).await?;
        Ok(filter_by_kind(&all, kind).cloned().collect())
    }

    pub async fn summary(&self, owner_id: &str) -> DbResult<LedgerSummary> {
        let all = self.list(owner_id).await?;
        Ok(LedgerSummary::from_transactions(&all))
    }

    /// Running summary, recomputed on every ledger change.
    pub fn subscribe_summary(&self, owner_id: &str) -> BoxStream<'static, DbResult<LedgerSummary>> {
        self.transactions
            .subscribe(owner_id)
            .map(|snapshot| snapshot.map(|txs| LedgerSummary::from_transactions(&txs)))
            .boxed()
    }

    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<Transaction>>> {
        self.transactions.subscribe(owner_id)
    }

    /// The owner's ledger as CSV, `None` when empty.
    pub async fn export_csv(&self, owner_id: &str) -> DbResult<Option<String>> {
        let all = self.list(owner_id).await?;
        Ok(to_csv(&all)?)
    }
}
