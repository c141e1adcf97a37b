//! Bank statement parsing
//!
//! Statements arrive as comma-separated files whose column layout varies
//! per bank, so each account carries a [`ColumnMapping`] telling the
//! parser where to find the description, amount, and date columns.

use std::path::Path;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::merchant;
use crate::types::*;

/// Date format used by statement files
pub const STATEMENT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Per-account column layout of a statement file
///
/// All indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column holding the transaction description
    pub description: usize,
    /// Column holding the signed decimal amount
    pub amount: usize,
    /// Column holding the `MM/DD/YYYY` date
    pub date: usize,
}

impl ColumnMapping {
    /// Create a new column mapping
    pub fn new(description: usize, amount: usize, date: usize) -> Self {
        Self {
            description,
            amount,
            date,
        }
    }

    /// Minimum number of columns a row must have to be parseable
    pub fn required_columns(&self) -> usize {
        self.description.max(self.amount).max(self.date) + 1
    }
}

/// Parse a statement file into normalized rows
///
/// Each valid row is annotated with the merchant resolved from its
/// description via the catalog's naming rules. Rows that are too short,
/// or whose amount or date does not parse, are silently dropped — a
/// statement's header line falls out this way. Parsing is a pure
/// function of the file contents, mapping, and catalog, so re-parsing
/// the same file yields the same sequence.
///
/// Fails with `InvalidFormat` if the file is not a `.csv` file, and with
/// `InvalidNamingRule` if the catalog holds a malformed pattern.
pub fn parse_statement(
    path: impl AsRef<Path>,
    mapping: &ColumnMapping,
    catalog: &[Merchant],
) -> ReconcileResult<Vec<StatementRow>> {
    let path = path.as_ref();

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ReconcileError::InvalidFormat(format!(
            "expected a .csv statement file, got '{}'",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();

    for (position, record) in reader.records().enumerate() {
        // A record that fails to read at all is treated like any other
        // malformed row: dropped without failing the parse.
        let Ok(record) = record else {
            continue;
        };

        if record.len() < mapping.required_columns() {
            continue;
        }

        let Ok(amount) = record[mapping.amount].trim().parse::<BigDecimal>() else {
            continue;
        };

        let Ok(date) = NaiveDate::parse_from_str(record[mapping.date].trim(), STATEMENT_DATE_FORMAT)
        else {
            continue;
        };

        let description = record[mapping.description].trim().to_string();
        let merchant_id = merchant::resolve(&description, catalog)?;

        rows.push(StatementRow {
            position,
            description,
            merchant_id,
            date,
            amount,
        });
    }

    Ok(rows)
}
