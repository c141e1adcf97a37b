//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for the ledger the engine reconciles against
///
/// This trait allows the reconciliation core to work with any storage
/// backend (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing
/// these methods. The engine reads through the first two methods and
/// writes back only through `mark_reconciled`, once, at commit time.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// List the unreconciled transactions for an account, ordered by
    /// date ascending
    ///
    /// Implementations must return a deterministic order for equal
    /// dates; the matcher's first-fit tie-break depends on it.
    async fn unreconciled_transactions(
        &self,
        account_id: &str,
    ) -> ReconcileResult<Vec<LedgerTransaction>>;

    /// The merchant catalog with naming rules, in storage order
    async fn merchant_catalog(&self) -> ReconcileResult<Vec<Merchant>>;

    /// Set `reconciled = true` on every listed transaction
    ///
    /// Must be all-or-nothing: if the write fails for any transaction,
    /// no transaction's flag may be durably changed.
    async fn mark_reconciled(&mut self, transaction_ids: &[String]) -> ReconcileResult<()>;
}
