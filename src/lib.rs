//! # Reconcile Core
//!
//! The statement-reconciliation engine of a personal ledger: given a
//! bank-supplied CSV statement and the account's unreconciled ledger
//! transactions, work out which ledger entries correspond to which
//! statement rows, surface ambiguous cases for human resolution, and
//! atomically mark resolved entries as reconciled.
//!
//! ## Features
//!
//! - **Statement parsing**: per-account column mappings over CSV files,
//!   with malformed rows dropped rather than failing the parse
//! - **Merchant resolution**: first-match naming rules (regular
//!   expressions) mapping descriptions to catalog merchants
//! - **Two-pass matching**: greedy exact matching with consumption,
//!   then non-consuming possible-match discovery on amount/date/merchant
//! - **Sessions**: snapshot-based, re-matchable, with an all-or-nothing
//!   commit of reconciled flags
//! - **Storage abstraction**: database-agnostic design with a
//!   trait-based ledger store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reconcile_core::{ColumnMapping, MemoryStore, ReconcileSession};
//!
//! # async fn run() -> Result<(), reconcile_core::ReconcileError> {
//! let store = MemoryStore::new();
//! let mapping = ColumnMapping::new(1, 2, 0);
//! let mut session =
//!     ReconcileSession::open(store, "statement.csv", "checking", &mapping).await?;
//!
//! if session.is_committable() {
//!     session.commit().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod merchant;
pub mod reconcile;
pub mod statement;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconcile::*;
pub use statement::*;
pub use traits::*;
pub use types::*;
pub use utils::*;
