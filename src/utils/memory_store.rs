//! In-memory store implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory ledger store for testing and development
///
/// Transactions are keyed by id; merchants keep their insertion order,
/// which is the catalog order the resolver iterates. `mark_reconciled`
/// validates every id before mutating anything, so a failed call leaves
/// no flag changed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    transactions: Arc<RwLock<HashMap<String, LedgerTransaction>>>,
    merchants: Arc<RwLock<Vec<Merchant>>>,
    fail_next_mark: Arc<RwLock<bool>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a transaction
    pub fn add_transaction(&self, transaction: LedgerTransaction) {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id.clone(), transaction);
    }

    /// Seed a merchant at the end of the catalog
    pub fn add_merchant(&self, merchant: Merchant) {
        self.merchants.write().unwrap().push(merchant);
    }

    /// Get a transaction by id
    pub fn get_transaction(&self, transaction_id: &str) -> Option<LedgerTransaction> {
        self.transactions
            .read()
            .unwrap()
            .get(transaction_id)
            .cloned()
    }

    /// Make the next `mark_reconciled` call fail without applying
    /// anything (simulates a store outage mid-commit)
    pub fn fail_next_mark(&self) {
        *self.fail_next_mark.write().unwrap() = true;
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.transactions.write().unwrap().clear();
        self.merchants.write().unwrap().clear();
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn unreconciled_transactions(
        &self,
        account_id: &str,
    ) -> ReconcileResult<Vec<LedgerTransaction>> {
        let transactions = self.transactions.read().unwrap();
        let mut filtered: Vec<LedgerTransaction> = transactions
            .values()
            .filter(|txn| txn.account_id == account_id && !txn.reconciled)
            .cloned()
            .collect();
        // Date ascending, id as the deterministic tie-break.
        filtered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(filtered)
    }

    async fn merchant_catalog(&self) -> ReconcileResult<Vec<Merchant>> {
        Ok(self.merchants.read().unwrap().clone())
    }

    async fn mark_reconciled(&mut self, transaction_ids: &[String]) -> ReconcileResult<()> {
        if std::mem::take(&mut *self.fail_next_mark.write().unwrap()) {
            return Err(ReconcileError::Storage(
                "simulated write failure".to_string(),
            ));
        }

        let mut transactions = self.transactions.write().unwrap();

        // Validate the whole batch before touching any flag.
        for id in transaction_ids {
            if !transactions.contains_key(id) {
                return Err(ReconcileError::Storage(format!(
                    "transaction not found: {id}"
                )));
            }
        }

        for id in transaction_ids {
            if let Some(txn) = transactions.get_mut(id) {
                txn.reconciled = true;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(id: &str, account: &str, d: NaiveDate) -> LedgerTransaction {
        LedgerTransaction::simple(
            id.to_string(),
            account.to_string(),
            d,
            BigDecimal::from(-10),
            None,
        )
    }

    #[tokio::test]
    async fn test_unreconciled_query_filters_and_orders() {
        let store = MemoryStore::new();
        store.add_transaction(txn("b", "checking", date(2024, 3, 5)));
        store.add_transaction(txn("a", "checking", date(2024, 3, 5)));
        store.add_transaction(txn("c", "checking", date(2024, 3, 1)));
        store.add_transaction(txn("d", "savings", date(2024, 3, 2)));

        let mut reconciled = txn("e", "checking", date(2024, 3, 3));
        reconciled.reconciled = true;
        store.add_transaction(reconciled);

        let listed = store.unreconciled_transactions("checking").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_mark_reconciled_unknown_id_changes_nothing() {
        let mut store = MemoryStore::new();
        store.add_transaction(txn("a", "checking", date(2024, 3, 1)));

        let err = store
            .mark_reconciled(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Storage(_)));
        assert!(!store.get_transaction("a").unwrap().reconciled);
    }

    #[tokio::test]
    async fn test_mark_reconciled_sets_flags() {
        let mut store = MemoryStore::new();
        store.add_transaction(txn("a", "checking", date(2024, 3, 1)));
        store.add_transaction(txn("b", "checking", date(2024, 3, 2)));

        store
            .mark_reconciled(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(store.get_transaction("a").unwrap().reconciled);
        assert!(store.get_transaction("b").unwrap().reconciled);
    }
}
