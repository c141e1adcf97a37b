//! Reconciliation engine: statement matching and session management

pub mod matcher;
pub mod session;

pub use matcher::*;
pub use session::*;
