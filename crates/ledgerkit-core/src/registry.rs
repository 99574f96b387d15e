use std::sync::Arc;

use uuid::Uuid;

use crate::models::write::{AccountPatch, CreateAccount};
use crate::models::{Account, AccountKind};
use crate::storage::{LedgerError, LedgerStore};

/// Chart of accounts seeded into a freshly provisioned tenant.
const DEFAULT_CHART: &[(&str, &str, AccountKind)] = &[
    ("1101", "Cash", AccountKind::Asset),
    ("1102", "Bank", AccountKind::Asset),
    ("1201", "Accounts Receivable", AccountKind::Asset),
    ("2101", "Accounts Payable", AccountKind::Liability),
    ("3101", "Owner's Equity", AccountKind::Equity),
    ("4101", "Sales Revenue", AccountKind::Revenue),
    ("5101", "Operating Expenses", AccountKind::Expense),
];

/// Authoritative source of per-tenant accounts and their current balances.
///
/// Balances mutate through the posting engine; the only direct write here is
/// the administrative override in `update_account`.
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Creates the tenant namespace and seeds the default chart of accounts.
    pub fn provision_tenant(&self, tenant: &str) -> Result<Vec<Account>, LedgerError> {
        self.store.create_tenant(tenant)?;

        let mut accounts = Vec::with_capacity(DEFAULT_CHART.len());
        for (code, name, kind) in DEFAULT_CHART {
            accounts.push(self.create_account(tenant, CreateAccount::new(*code, *name, *kind))?);
        }

        tracing::info!(tenant, accounts = accounts.len(), "tenant provisioned");
        Ok(accounts)
    }

    pub fn create_account(&self, tenant: &str, cmd: CreateAccount) -> Result<Account, LedgerError> {
        let account = Account {
            id: Uuid::new_v4(),
            code: cmd.code,
            name: cmd.name,
            kind: cmd.kind,
            balance: cmd.opening_balance,
        };
        self.store.insert_account(tenant, &account)?;
        tracing::info!(tenant, code = %account.code, kind = %account.kind, "account created");
        Ok(account)
    }

    pub fn get_account(&self, tenant: &str, id: Uuid) -> Result<Account, LedgerError> {
        self.store.get_account(tenant, id)
    }

    pub fn list_accounts(&self, tenant: &str) -> Result<Vec<Account>, LedgerError> {
        self.store.list_accounts(tenant)
    }

    /// Applies a partial update. Patching `balance` writes past the posting
    /// engine and is logged as an administrative override. Changing `kind`
    /// is refused while the account carries a nonzero balance, since the
    /// stored sign would be reinterpreted against the new natural side;
    /// the balance patch is applied first, so zeroing and re-typing in one
    /// patch is allowed.
    pub fn update_account(
        &self,
        tenant: &str,
        id: Uuid,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        let mut account = self.store.get_account(tenant, id)?;

        if let Some(code) = patch.code {
            account.code = code;
        }
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(balance) = patch.balance {
            tracing::warn!(
                tenant,
                code = %account.code,
                old = %account.balance,
                new = %balance,
                "administrative balance override"
            );
            account.balance = balance;
        }
        if let Some(kind) = patch.kind {
            if kind != account.kind && !account.balance.is_zero() {
                return Err(LedgerError::KindChangeWithBalance(account.id.to_string()));
            }
            account.kind = kind;
        }

        self.store.update_account(tenant, &account)?;
        Ok(account)
    }

    pub fn delete_account(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        self.store.delete_account(tenant, id)?;
        tracing::info!(tenant, account = %id, "account deleted");
        Ok(())
    }
}
