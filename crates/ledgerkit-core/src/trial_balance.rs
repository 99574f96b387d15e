use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::{AccountKind, TrialBalance, TrialBalanceRow};
use crate::storage::{LedgerError, LedgerStore};
use crate::BALANCE_TOLERANCE;

/// Splits a stored natural-side balance into its debit and credit columns.
/// A positive balance lands in the account kind's normal column; a negative
/// one flips to the opposite column.
pub fn split_balance(kind: AccountKind, balance: Decimal) -> (Decimal, Decimal) {
    let (debit, credit) = if kind.is_debit_normal() {
        (balance, -balance)
    } else {
        (-balance, balance)
    };
    (debit.max(Decimal::ZERO), credit.max(Decimal::ZERO))
}

/// Derives a snapshot report proving the ledger is balanced.
pub struct TrialBalanceReporter {
    store: Arc<dyn LedgerStore>,
}

impl TrialBalanceReporter {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// One row per account in code order, plus column totals. A discrepancy
    /// beyond the tolerance means an account was mutated outside the posting
    /// engine; it is flagged, never hidden.
    pub fn generate(&self, tenant: &str) -> Result<TrialBalance, LedgerError> {
        let accounts = self.store.list_accounts(tenant)?;

        let mut rows = Vec::with_capacity(accounts.len());
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        for account in accounts {
            let (debit, credit) = split_balance(account.kind, account.balance);
            total_debit += debit;
            total_credit += credit;
            rows.push(TrialBalanceRow {
                code: account.code,
                name: account.name,
                kind: account.kind,
                debit,
                credit,
            });
        }

        let report = TrialBalance {
            rows,
            total_debit,
            total_credit,
        };

        if !report.is_balanced() {
            tracing::warn!(
                tenant,
                total_debit = %report.total_debit,
                total_credit = %report.total_credit,
                discrepancy = %report.discrepancy(),
                "trial balance out of balance"
            );
        }

        Ok(report)
    }
}
