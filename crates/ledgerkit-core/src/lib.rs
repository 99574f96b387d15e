//! Core types and traits for the ledgerkit double-entry ledger.
//!
//! This crate provides the `LedgerStore` trait and all associated types,
//! plus the three tenant-scoped domain components built on top of it:
//! the account registry, the posting engine and the trial balance reporter.
//! Storage backends live in separate crates.

pub mod engine;
pub mod models;
pub mod registry;
pub mod storage;
pub mod trial_balance;

// Re-export key types at crate root for convenience
pub use engine::PostingEngine;
pub use models::write::{AccountPatch, CreateAccount, EntryPatch, PostEntry};
pub use models::{Account, AccountKind, JournalEntry, JournalLine, TrialBalance, TrialBalanceRow};
pub use registry::AccountRegistry;
pub use storage::{LedgerError, LedgerStore};
pub use trial_balance::TrialBalanceReporter;

use rust_decimal::Decimal;

/// Maximum tolerated imbalance between an entry's debit and credit totals,
/// and between the trial balance columns: 0.01 (one cent).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
