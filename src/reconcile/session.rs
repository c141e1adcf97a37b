//! Reconcile session lifecycle and operations

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reconcile::matcher::{self, MatchOutcome, ReconcileRow};
use crate::statement::{self, ColumnMapping};
use crate::traits::LedgerStore;
use crate::types::*;

/// Lifecycle state of a reconcile session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting overrides and a commit
    Open,
    /// Reconciled flags written; session finished
    Committed,
    /// Abandoned without writes
    Discarded,
}

/// A single reconciliation run against one account and one statement file
///
/// The session snapshots the account's unreconciled transactions exactly
/// once, at construction. Every re-match (including merchant overrides)
/// works against a copy of that snapshot, never a fresh store read, so
/// results are reproducible for the session's lifetime. The session is
/// an explicit handle: callers that want a single "current" session keep
/// one themselves; the engine places no such restriction.
#[derive(Debug)]
pub struct ReconcileSession<S: LedgerStore> {
    id: Uuid,
    store: S,
    account_id: String,
    snapshot: Vec<LedgerTransaction>,
    statement_rows: Vec<StatementRow>,
    outcome: MatchOutcome,
    state: SessionState,
}

impl<S: LedgerStore> ReconcileSession<S> {
    /// Open a session: snapshot the ledger, parse the statement, and
    /// run the initial match
    ///
    /// Fails with `InvalidFormat` if the statement file is not a `.csv`
    /// file; no session is created in that case.
    pub async fn open(
        store: S,
        statement_path: impl AsRef<Path>,
        account_id: &str,
        mapping: &ColumnMapping,
    ) -> ReconcileResult<Self> {
        let catalog = store.merchant_catalog().await?;
        let statement_rows = statement::parse_statement(statement_path, mapping, &catalog)?;
        let snapshot = store.unreconciled_transactions(account_id).await?;
        let outcome = matcher::match_statement(&statement_rows, &snapshot);

        Ok(Self {
            id: Uuid::new_v4(),
            store,
            account_id: account_id.to_string(),
            snapshot,
            statement_rows,
            outcome,
            state: SessionState::Open,
        })
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Account being reconciled
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current reconcile rows, in statement order
    pub fn rows(&self) -> &[ReconcileRow] {
        &self.outcome.rows
    }

    /// Snapshot transactions with no confirmed match, date descending
    pub fn orphans(&self) -> &[LedgerTransaction] {
        &self.outcome.orphans
    }

    /// Whether every statement row has a confirmed match
    ///
    /// Rows with only possible matches, and orphaned rows, block commit.
    pub fn is_committable(&self) -> bool {
        self.outcome.all_confirmed()
    }

    /// Override the resolved merchant on one statement row and re-run
    /// the full match against the original snapshot
    ///
    /// `position` is the row's position index from the statement file.
    pub fn override_merchant(
        &mut self,
        position: usize,
        merchant_id: Option<String>,
    ) -> ReconcileResult<()> {
        self.ensure_open()?;

        let row = self
            .statement_rows
            .iter_mut()
            .find(|row| row.position == position)
            .ok_or(ReconcileError::RowNotFound(position))?;
        row.merchant_id = merchant_id;

        self.outcome = matcher::match_statement(&self.statement_rows, &self.snapshot);
        Ok(())
    }

    /// Persist `reconciled = true` for every confirmed match
    ///
    /// Fails with `NotCommittable` if any row lacks a confirmed match.
    /// The store write is all-or-nothing; if it fails, the session stays
    /// `Open` so the caller can retry.
    pub async fn commit(&mut self) -> ReconcileResult<()> {
        self.ensure_open()?;

        if !self.is_committable() {
            let unconfirmed = self
                .outcome
                .rows
                .iter()
                .filter(|row| !row.is_confirmed())
                .count();
            return Err(ReconcileError::NotCommittable(format!(
                "{unconfirmed} statement row(s) without a confirmed match"
            )));
        }

        let ids = self.outcome.confirmed_ids();
        self.store.mark_reconciled(&ids).await?;
        self.state = SessionState::Committed;
        Ok(())
    }

    /// Abandon the session without writing anything
    pub fn discard(&mut self) -> ReconcileResult<()> {
        self.ensure_open()?;
        self.state = SessionState::Discarded;
        Ok(())
    }

    fn ensure_open(&self) -> ReconcileResult<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Committed => Err(ReconcileError::SessionClosed(
                "session already committed".to_string(),
            )),
            SessionState::Discarded => Err(ReconcileError::SessionClosed(
                "session was discarded".to_string(),
            )),
        }
    }
}
