//! The reconciliation matching algorithm
//!
//! Pairs statement rows against a snapshot of unreconciled ledger
//! transactions in two passes: a greedy exact-match pass that consumes
//! ledger transactions as it goes, and a non-consuming pass that
//! collects partial matches for human review.
//!
//! Matching is intentionally first-fit in input order with no
//! backtracking, not a globally optimal assignment. An earlier
//! statement row can consume a transaction that would have been the
//! only match for a later row. Downstream behavior depends on this
//! exact tie-break, so it must not be "improved".

use serde::{Deserialize, Serialize};

use crate::types::*;

/// One statement row paired with its match state after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRow {
    /// The statement row being reconciled
    pub statement_row: StatementRow,
    /// The confirmed ledger match, if the exact pass found one
    pub confirmed: Option<LedgerTransaction>,
    /// Partial matches collected for unconfirmed rows (exactly two of
    /// amount/date/merchant agree)
    pub possible: Vec<LedgerTransaction>,
}

impl ReconcileRow {
    /// Whether this row has a confirmed ledger match
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }
}

/// Result of a single matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// One entry per statement row, in statement order
    pub rows: Vec<ReconcileRow>,
    /// Snapshot transactions with no confirmed match, date descending
    pub orphans: Vec<LedgerTransaction>,
}

impl MatchOutcome {
    /// Whether every statement row has a confirmed match
    pub fn all_confirmed(&self) -> bool {
        self.rows.iter().all(ReconcileRow::is_confirmed)
    }

    /// Ids of all confirmed ledger transactions
    pub fn confirmed_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.confirmed.as_ref().map(|txn| txn.id.clone()))
            .collect()
    }
}

/// Count how many of amount, date, and merchant agree between a
/// statement row and a ledger transaction
///
/// Amounts compare by absolute value, dates by calendar day. An unset
/// statement merchant never contributes a point, so such a row scores
/// at most 2 (amount + date).
pub fn field_score(row: &StatementRow, txn: &LedgerTransaction) -> u8 {
    let mut score = 0;

    if row.amount.abs() == txn.net_amount().abs() {
        score += 1;
    }
    if row.date == txn.date {
        score += 1;
    }
    if row.merchant_id.is_some() && row.merchant_id == txn.merchant_id {
        score += 1;
    }

    score
}

/// Whether a row and transaction qualify as an exact match
///
/// Amount and date must agree; the merchant must agree unless the
/// statement row has no resolved merchant, in which case it acts as a
/// wildcard.
fn is_exact(row: &StatementRow, txn: &LedgerTransaction) -> bool {
    row.amount.abs() == txn.net_amount().abs()
        && row.date == txn.date
        && (row.merchant_id.is_none() || row.merchant_id == txn.merchant_id)
}

/// Run the full matching algorithm over a statement and a ledger snapshot
///
/// The snapshot is never modified; each run works on its own copy. Must
/// be re-run from scratch whenever any input changes (e.g. a merchant
/// override).
pub fn match_statement(
    statement_rows: &[StatementRow],
    snapshot: &[LedgerTransaction],
) -> MatchOutcome {
    let mut pool: Vec<LedgerTransaction> = snapshot.to_vec();
    let mut rows: Vec<ReconcileRow> = Vec::with_capacity(statement_rows.len());

    // Pass 1: greedy exact matching. The first pool transaction that
    // agrees on all three fields is taken and removed immediately.
    for statement_row in statement_rows {
        let confirmed = pool
            .iter()
            .position(|txn| is_exact(statement_row, txn))
            .map(|index| pool.remove(index));

        rows.push(ReconcileRow {
            statement_row: statement_row.clone(),
            confirmed,
            possible: Vec::new(),
        });
    }

    // Pass 2: collect possible matches for unconfirmed rows from what
    // the exact pass left behind. Nothing is consumed here, so one
    // transaction can appear under several rows.
    for row in rows.iter_mut().filter(|row| !row.is_confirmed()) {
        row.possible = pool
            .iter()
            .filter(|txn| field_score(&row.statement_row, txn) == 2)
            .cloned()
            .collect();
    }

    // Orphans are the pool remainder, newest first for presentation.
    let mut orphans = pool;
    orphans.sort_by(|a, b| b.date.cmp(&a.date));

    MatchOutcome { rows, orphans }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn amount(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn txn(id: &str, d: NaiveDate, amt: &str, merchant: Option<&str>) -> LedgerTransaction {
        LedgerTransaction::simple(
            id.to_string(),
            "checking".to_string(),
            d,
            amount(amt),
            merchant.map(|m| m.to_string()),
        )
    }

    fn row(position: usize, d: NaiveDate, amt: &str, merchant: Option<&str>) -> StatementRow {
        StatementRow {
            position,
            description: format!("ROW {position}"),
            merchant_id: merchant.map(|m| m.to_string()),
            date: d,
            amount: amount(amt),
        }
    }

    #[test]
    fn test_exact_match_on_all_three_fields() {
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", Some("m"))];
        let rows = vec![row(0, date(2024, 3, 1), "-20.00", Some("m"))];

        let outcome = match_statement(&rows, &snapshot);

        assert_eq!(outcome.rows[0].confirmed.as_ref().unwrap().id, "t1");
        assert!(outcome.orphans.is_empty());
        assert!(outcome.all_confirmed());
    }

    #[test]
    fn test_two_of_three_is_a_possible_match_not_confirmed() {
        // Same amount and merchant, different day.
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", Some("m"))];
        let rows = vec![row(0, date(2024, 3, 2), "-20.00", Some("m"))];

        let outcome = match_statement(&rows, &snapshot);

        assert!(outcome.rows[0].confirmed.is_none());
        assert_eq!(outcome.rows[0].possible.len(), 1);
        assert_eq!(outcome.rows[0].possible[0].id, "t1");
        assert_eq!(outcome.orphans.len(), 1);
        assert!(!outcome.all_confirmed());
    }

    #[test]
    fn test_unset_statement_merchant_is_wildcard_for_exact_match() {
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", Some("m"))];
        let rows = vec![row(0, date(2024, 3, 1), "-20.00", None)];

        let outcome = match_statement(&rows, &snapshot);
        assert_eq!(outcome.rows[0].confirmed.as_ref().unwrap().id, "t1");
    }

    #[test]
    fn test_greedy_takes_first_pool_transaction_on_tie() {
        // Two identical candidates; the first in snapshot order wins.
        let snapshot = vec![
            txn("t1", date(2024, 3, 5), "-10.00", None),
            txn("t2", date(2024, 3, 5), "-10.00", None),
        ];
        let rows = vec![row(0, date(2024, 3, 5), "-10.00", None)];

        let outcome = match_statement(&rows, &snapshot);

        assert_eq!(outcome.rows[0].confirmed.as_ref().unwrap().id, "t1");
        assert_eq!(outcome.orphans.len(), 1);
        assert_eq!(outcome.orphans[0].id, "t2");
    }

    #[test]
    fn test_earlier_row_consumes_candidate_of_later_row() {
        // Row 0 (merchant unset) greedily takes t1 even though t1 is the
        // only exact candidate for row 1. No backtracking.
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", Some("m"))];
        let rows = vec![
            row(0, date(2024, 3, 1), "-20.00", None),
            row(1, date(2024, 3, 1), "-20.00", Some("m")),
        ];

        let outcome = match_statement(&rows, &snapshot);

        assert_eq!(outcome.rows[0].confirmed.as_ref().unwrap().id, "t1");
        assert!(outcome.rows[1].confirmed.is_none());
        // t1 left the pool in pass 1, so it is not even a possible match.
        assert!(outcome.rows[1].possible.is_empty());
    }

    #[test]
    fn test_no_transaction_confirmed_twice() {
        let snapshot = vec![
            txn("t1", date(2024, 3, 1), "-20.00", None),
            txn("t2", date(2024, 3, 2), "-30.00", None),
        ];
        let rows = vec![
            row(0, date(2024, 3, 1), "-20.00", None),
            row(1, date(2024, 3, 1), "-20.00", None),
            row(2, date(2024, 3, 2), "-30.00", None),
        ];

        let outcome = match_statement(&rows, &snapshot);

        let confirmed = outcome.confirmed_ids();
        assert_eq!(confirmed.len(), 2);
        let mut deduped = confirmed.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), confirmed.len());
    }

    #[test]
    fn test_possible_match_can_appear_under_multiple_rows() {
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", Some("m"))];
        let rows = vec![
            row(0, date(2024, 3, 2), "-20.00", Some("m")),
            row(1, date(2024, 3, 3), "-20.00", Some("m")),
        ];

        let outcome = match_statement(&rows, &snapshot);

        assert_eq!(outcome.rows[0].possible.len(), 1);
        assert_eq!(outcome.rows[1].possible.len(), 1);
        assert_eq!(outcome.rows[0].possible[0].id, "t1");
        assert_eq!(outcome.rows[1].possible[0].id, "t1");
    }

    #[test]
    fn test_orphans_and_confirmed_partition_the_snapshot() {
        let snapshot = vec![
            txn("t1", date(2024, 3, 1), "-20.00", None),
            txn("t2", date(2024, 3, 2), "-30.00", None),
            txn("t3", date(2024, 3, 3), "-40.00", None),
        ];
        let rows = vec![row(0, date(2024, 3, 2), "-30.00", None)];

        let outcome = match_statement(&rows, &snapshot);

        let mut seen: Vec<&str> = outcome
            .orphans
            .iter()
            .map(|t| t.id.as_str())
            .chain(
                outcome
                    .rows
                    .iter()
                    .filter_map(|r| r.confirmed.as_ref())
                    .map(|t| t.id.as_str()),
            )
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_orphans_sorted_date_descending() {
        let snapshot = vec![
            txn("t1", date(2024, 3, 1), "-1.00", None),
            txn("t2", date(2024, 3, 9), "-2.00", None),
            txn("t3", date(2024, 3, 5), "-3.00", None),
        ];

        let outcome = match_statement(&[], &snapshot);

        let dates: Vec<NaiveDate> = outcome.orphans.iter().map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 3, 9), date(2024, 3, 5), date(2024, 3, 1)]
        );
    }

    #[test]
    fn test_amounts_compare_by_absolute_value() {
        // Bank reports a debit as positive; ledger records it negative.
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-20.00", None)];
        let rows = vec![row(0, date(2024, 3, 1), "20.00", None)];

        let outcome = match_statement(&rows, &snapshot);
        assert!(outcome.rows[0].is_confirmed());
    }

    #[test]
    fn test_split_transaction_matches_on_net_amount() {
        let ledger = LedgerTransaction::new(
            "t1".to_string(),
            "checking".to_string(),
            date(2024, 3, 1),
        )
        .with_line_item(LineItem::new(amount("-15.00"), vec!["groceries".to_string()]))
        .with_line_item(LineItem::new(amount("-5.00"), vec!["alcohol".to_string()]));

        let rows = vec![row(0, date(2024, 3, 1), "-20.00", None)];
        let outcome = match_statement(&rows, &[ledger]);
        assert!(outcome.rows[0].is_confirmed());
    }

    #[test]
    fn test_score_one_or_zero_is_ignored() {
        // Only the date agrees: neither confirmed nor possible.
        let snapshot = vec![txn("t1", date(2024, 3, 1), "-99.00", Some("other"))];
        let rows = vec![row(0, date(2024, 3, 1), "-20.00", Some("m"))];

        let outcome = match_statement(&rows, &snapshot);

        assert!(outcome.rows[0].confirmed.is_none());
        assert!(outcome.rows[0].possible.is_empty());
        assert_eq!(outcome.orphans.len(), 1);
    }

    #[test]
    fn test_unset_merchant_scores_at_most_two() {
        let ledger = txn("t1", date(2024, 3, 1), "-20.00", None);
        let statement = row(0, date(2024, 3, 2), "-20.00", None);

        // Amount agrees, date differs, merchant unset on the row: 1 point.
        assert_eq!(field_score(&statement, &ledger), 1);

        let same_day = row(0, date(2024, 3, 1), "-20.00", None);
        assert_eq!(field_score(&same_day, &ledger), 2);
    }
}
