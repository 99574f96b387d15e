use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, JournalEntry};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("tenant not found: {0}")]
    TenantNotFound(String),
    #[error("tenant already exists: {0}")]
    TenantAlreadyExists(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("duplicate account code: {0}")]
    DuplicateCode(String),
    #[error("invalid account type: {0}")]
    InvalidAccountType(String),
    #[error("account {0} is referenced by journal lines and cannot be deleted")]
    AccountInUse(String),
    #[error("journal entry not found: {0}")]
    EntryNotFound(String),
    #[error("journal entry must have at least one line")]
    EmptyEntry,
    #[error("line amounts must not be negative")]
    NegativeAmount,
    #[error("a line cannot carry both a debit and a credit")]
    DebitAndCredit,
    #[error("entry is out of balance: debits {debits} != credits {credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },
    #[error("account {0} cannot change kind while its balance is nonzero")]
    KindChangeWithBalance(String),
}

/// Persistence collaborator for the ledger. Backends provide durable storage
/// of tenants, accounts and journal entries, and the atomicity the engine
/// relies on: `insert_entry`, `replace_entry` and `remove_entry` each commit
/// entirely or not at all, even when other writers run concurrently.
///
/// Every data operation is scoped by `tenant`; the tenant id is resolved by
/// the caller and never inferred here.
pub trait LedgerStore: Send + Sync {
    // Tenant namespaces
    fn create_tenant(&self, tenant: &str) -> Result<(), LedgerError>;
    fn tenant_exists(&self, tenant: &str) -> bool;
    fn list_tenants(&self) -> Vec<Arc<str>>;

    // Chart of accounts
    /// Persists a new account. Fails with `DuplicateCode` when the code is
    /// already taken within the tenant.
    fn insert_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError>;
    fn get_account(&self, tenant: &str, id: Uuid) -> Result<Account, LedgerError>;
    /// All accounts for the tenant, ordered by code ascending.
    fn list_accounts(&self, tenant: &str) -> Result<Vec<Account>, LedgerError>;
    /// Persists a full account row, re-checking code uniqueness.
    fn update_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError>;
    /// Fails with `AccountInUse` when any journal line references the account.
    fn delete_account(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError>;

    // Journal entries
    /// Persists the entry with its lines and applies each line's effect to
    /// the referenced account's balance (signed per the account's
    /// natural-balance side), atomically.
    fn insert_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError>;
    fn get_entry(&self, tenant: &str, id: Uuid) -> Result<JournalEntry, LedgerError>;
    /// All entries for the tenant, newest date first.
    fn list_entries(&self, tenant: &str) -> Result<Vec<JournalEntry>, LedgerError>;
    /// Swaps the stored entry with `entry.id` for `entry` in one atomic
    /// step: the old lines' balance effect is reversed and the new lines'
    /// applied together, or nothing changes. Fails with `EntryNotFound`
    /// when no entry with that id exists, `AccountNotFound` when a new
    /// line references a missing account.
    fn replace_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError>;
    /// Reverses every line's balance effect and deletes the entry and its
    /// lines, atomically.
    fn remove_entry(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError>;

    /// Monotonically increasing per-tenant counter for generated references.
    fn next_reference(&self, tenant: &str) -> Result<u64, LedgerError>;
}
