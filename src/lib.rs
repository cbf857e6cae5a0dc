//! Installment Ledger
//!
//! Contract and installment ledger for device sales on credit: prices a
//! purchase, creates the contract with its monthly schedule and down payment,
//! and applies confirmed payments against the schedule atomically.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod storage;

// Re-export commonly used types
pub use app::{configure_app, AppServices};
pub use modules::contracts;
pub use modules::installments;
pub use modules::payments;
pub use storage::{InMemoryLedgerStore, LedgerStore, LedgerTransaction, MySqlLedgerStore};
