use std::{fmt::Display, str::FromStr};

use prettytable::{row, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::storage::LedgerError;

pub mod write;

/// Account classification. Determines which trial balance column a positive
/// balance lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "ASSET",
            AccountKind::Liability => "LIABILITY",
            AccountKind::Equity => "EQUITY",
            AccountKind::Revenue => "REVENUE",
            AccountKind::Expense => "EXPENSE",
        }
    }

    /// Positive balances show under the debit column for these kinds.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountKind::Asset | AccountKind::Expense)
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSET" => Ok(AccountKind::Asset),
            "LIABILITY" => Ok(AccountKind::Liability),
            "EQUITY" => Ok(AccountKind::Equity),
            "REVENUE" => Ok(AccountKind::Revenue),
            "EXPENSE" => Ok(AccountKind::Expense),
            other => Err(LedgerError::InvalidAccountType(other.to_string())),
        }
    }
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart-of-accounts entry. `balance` is the signed running effect of all
/// posted lines on the account's natural side: debits increase assets and
/// expenses, credits increase liabilities, equity and revenue. A negative
/// balance means the account sits on its abnormal side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
}

/// One side of a journal entry. Exactly one of `debit`/`credit` may be
/// nonzero; both are always >= 0. Owned by its parent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_id: Uuid,
    pub description: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl JournalLine {
    /// Net effect of this line on the balance of an account of the given
    /// kind, signed per the natural-balance convention.
    pub fn delta_for(&self, kind: AccountKind) -> Decimal {
        if kind.is_debit_normal() {
            self.debit - self.credit
        } else {
            self.credit - self.debit
        }
    }
}

/// A committed journal entry. Lines are created and destroyed with the
/// entry, never individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub date: Date,
    pub reference: String,
    pub description: Option<String>,
    pub lines: Vec<JournalLine>,
    pub created_at: OffsetDateTime,
}

impl JournalEntry {
    pub fn total_debits(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credits(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// One trial balance row. `debit` and `credit` are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Snapshot trial balance report, one row per account in code order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl TrialBalance {
    /// Absolute difference between the two column totals. Anything above
    /// the tolerance means balances were mutated outside the engine.
    pub fn discrepancy(&self) -> Decimal {
        (self.total_debit - self.total_credit).abs()
    }

    pub fn is_balanced(&self) -> bool {
        self.discrepancy() <= crate::BALANCE_TOLERANCE
    }
}

impl Display for TrialBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Code", "Account", "Debit", "Credit"]);
        table.add_empty_row();

        for item in &self.rows {
            let debit = if item.debit.is_zero() { String::new() } else { item.debit.to_string() };
            let credit = if item.credit.is_zero() { String::new() } else { item.credit.to_string() };
            table.add_row(row![item.code, item.name, debit, credit]);
        }

        table.add_empty_row();
        table.add_row(row!["", "Total", self.total_debit, self.total_credit]);

        write!(f, "\n{}\n", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn account_kind_round_trips_through_str() {
        for kind in [
            AccountKind::Asset,
            AccountKind::Liability,
            AccountKind::Equity,
            AccountKind::Revenue,
            AccountKind::Expense,
        ] {
            assert_eq!(kind.as_str().parse::<AccountKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_account_kind_is_rejected() {
        let err = "INCOME".parse::<AccountKind>().unwrap_err();
        match err {
            LedgerError::InvalidAccountType(s) => assert_eq!(s, "INCOME"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn line_delta_follows_the_natural_balance_side() {
        let debit_line = JournalLine {
            account_id: Uuid::new_v4(),
            description: None,
            debit: dec!(120.50),
            credit: Decimal::ZERO,
        };
        assert_eq!(debit_line.delta_for(AccountKind::Asset), dec!(120.50));
        assert_eq!(debit_line.delta_for(AccountKind::Revenue), dec!(-120.50));

        let credit_line = JournalLine {
            account_id: Uuid::new_v4(),
            description: None,
            debit: Decimal::ZERO,
            credit: dec!(120.50),
        };
        assert_eq!(credit_line.delta_for(AccountKind::Expense), dec!(-120.50));
        assert_eq!(credit_line.delta_for(AccountKind::Liability), dec!(120.50));
    }

    #[test]
    fn trial_balance_discrepancy() {
        let tb = TrialBalance {
            rows: Vec::new(),
            total_debit: dec!(500),
            total_credit: dec!(500),
        };
        assert!(tb.is_balanced());

        let tb = TrialBalance {
            rows: Vec::new(),
            total_debit: dec!(500),
            total_credit: dec!(480),
        };
        assert!(!tb.is_balanced());
        assert_eq!(tb.discrepancy(), dec!(20));
    }
}
