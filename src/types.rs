//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single split line within a ledger transaction
///
/// A purchase can be split across several line items (e.g. part of a
/// supermarket receipt tagged "groceries" and part tagged "alcohol").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Signed amount: positive for income, negative for expense
    pub amount: BigDecimal,
    /// Free-form tags attached to this portion of the transaction
    pub tags: Vec<String>,
}

impl LineItem {
    /// Create a new line item
    pub fn new(amount: BigDecimal, tags: Vec<String>) -> Self {
        Self { amount, tags }
    }

    /// Create an untagged line item
    pub fn untagged(amount: BigDecimal) -> Self {
        Self {
            amount,
            tags: Vec::new(),
        }
    }
}

/// A persisted ledger transaction awaiting (or having undergone) reconciliation
///
/// Owned by the ledger store; the engine only reads it and, on commit,
/// flips `reconciled` through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Account this transaction belongs to
    pub account_id: String,
    /// Date the transaction occurred (day granularity)
    pub date: NaiveDate,
    /// Merchant this transaction was recorded against, if known
    pub merchant_id: Option<String>,
    /// Whether the transaction has been matched to a statement row
    pub reconciled: bool,
    /// Ordered split line items making up the transaction
    pub line_items: Vec<LineItem>,
}

impl LedgerTransaction {
    /// Create a new unreconciled transaction with no line items
    pub fn new(id: String, account_id: String, date: NaiveDate) -> Self {
        Self {
            id,
            account_id,
            date,
            merchant_id: None,
            reconciled: false,
            line_items: Vec::new(),
        }
    }

    /// Create an unreconciled single-amount transaction
    pub fn simple(
        id: String,
        account_id: String,
        date: NaiveDate,
        amount: BigDecimal,
        merchant_id: Option<String>,
    ) -> Self {
        Self {
            id,
            account_id,
            date,
            merchant_id,
            reconciled: false,
            line_items: vec![LineItem::untagged(amount)],
        }
    }

    /// Append a line item, builder style
    pub fn with_line_item(mut self, line_item: LineItem) -> Self {
        self.line_items.push(line_item);
        self
    }

    /// Net amount of the transaction: the sum of all line-item amounts
    ///
    /// Positive for income, negative for expense, by the convention of
    /// whoever recorded the line items. Pure read, no side effects.
    pub fn net_amount(&self) -> BigDecimal {
        self.line_items.iter().map(|li| &li.amount).sum()
    }
}

/// A merchant known to the ledger, optionally carrying a naming rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    /// Unique identifier for the merchant
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional regular expression matched (substring search) against
    /// statement descriptions to auto-resolve rows to this merchant
    pub naming_rule: Option<String>,
}

impl Merchant {
    /// Create a merchant without a naming rule
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            naming_rule: None,
        }
    }

    /// Create a merchant with a naming rule
    pub fn with_naming_rule(id: String, name: String, naming_rule: String) -> Self {
        Self {
            id,
            name,
            naming_rule: Some(naming_rule),
        }
    }
}

/// One parsed line from an externally supplied bank statement
///
/// Created fresh on every parse; never persisted. The position index is
/// the row's stable identity within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Zero-based row number in the statement file
    pub position: usize,
    /// Raw description text from the statement
    pub description: String,
    /// Merchant resolved from the description, if any rule matched
    pub merchant_id: Option<String>,
    /// Parsed transaction date (day granularity)
    pub date: NaiveDate,
    /// Parsed signed amount
    pub amount: BigDecimal,
}

/// Errors that can occur in the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid statement format: {0}")]
    InvalidFormat(String),
    #[error("Statement file error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid naming rule for merchant '{merchant}': {source}")]
    InvalidNamingRule {
        merchant: String,
        source: regex::Error,
    },
    #[error("Statement row not found at position {0}")]
    RowNotFound(usize),
    #[error("Session is not committable: {0}")]
    NotCommittable(String),
    #[error("Session is closed: {0}")]
    SessionClosed(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
