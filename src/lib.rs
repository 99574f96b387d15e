//! Tenant-scoped double-entry ledger.
//!
//! The core exposes three components over a pluggable [`LedgerStore`]:
//! an account registry (chart of accounts), a posting engine that validates
//! and atomically commits balanced journal entries, and a trial balance
//! reporter. Two backends ship with the workspace: [`MemoryStore`] and
//! [`SqliteStore`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use ledgerkit::{
//!     AccountRegistry, JournalLine, MemoryStore, PostEntry, PostingEngine,
//!     TrialBalanceReporter,
//! };
//! use rust_decimal::Decimal;
//! use time::{Date, Month};
//!
//! # fn main() -> Result<(), ledgerkit::LedgerError> {
//! let store = Arc::new(MemoryStore::new());
//! let registry = AccountRegistry::new(store.clone());
//! let engine = PostingEngine::new(store.clone());
//! let reporter = TrialBalanceReporter::new(store.clone());
//!
//! let accounts = registry.provision_tenant("acme")?;
//! let cash = accounts.iter().find(|a| a.code == "1101").unwrap();
//! let sales = accounts.iter().find(|a| a.code == "4101").unwrap();
//!
//! engine.post_entry(
//!     "acme",
//!     PostEntry {
//!         date: Date::from_calendar_date(2024, Month::March, 1).unwrap(),
//!         reference: None,
//!         description: Some("cash sale".into()),
//!         lines: vec![
//!             JournalLine {
//!                 account_id: cash.id,
//!                 description: None,
//!                 debit: Decimal::from(500),
//!                 credit: Decimal::ZERO,
//!             },
//!             JournalLine {
//!                 account_id: sales.id,
//!                 description: None,
//!                 debit: Decimal::ZERO,
//!                 credit: Decimal::from(500),
//!             },
//!         ],
//!     },
//! )?;
//!
//! let report = reporter.generate("acme")?;
//! assert!(report.is_balanced());
//! # Ok(())
//! # }
//! ```

pub use ledgerkit_core::{
    Account, AccountKind, AccountPatch, AccountRegistry, CreateAccount, EntryPatch, JournalEntry,
    JournalLine, LedgerError, LedgerStore, PostEntry, PostingEngine, TrialBalance,
    TrialBalanceReporter, TrialBalanceRow, BALANCE_TOLERANCE,
};
pub use ledgerkit_memory::MemoryStore;
pub use ledgerkit_sqlite::SqliteStore;
