use rust_decimal::Decimal;
use time::Date;

use super::{AccountKind, JournalLine};

/// Command to create an account in a tenant's chart of accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAccount {
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    /// Seed balance, zero for a fresh account.
    pub opening_balance: Decimal,
}

impl CreateAccount {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            opening_balance: Decimal::ZERO,
        }
    }
}

/// Partial account update. Only fields that are `Some` are applied.
///
/// Patching `balance` bypasses the posting engine and is reserved for
/// opening-balance seeding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub balance: Option<Decimal>,
}

/// Command to post a new journal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PostEntry {
    pub date: Date,
    /// Free-text reference; a `JV-NNNNNN` sequence tag is generated when absent.
    pub reference: Option<String>,
    pub description: Option<String>,
    pub lines: Vec<JournalLine>,
}

/// Partial journal entry update. An absent `lines` leaves the line set (and
/// therefore every account balance) untouched; a present `lines` replaces
/// the full set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub date: Option<Date>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub lines: Option<Vec<JournalLine>>,
}
