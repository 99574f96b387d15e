//! In-memory `LedgerStore` backend.
//!
//! State lives in per-tenant maps behind a single `RwLock`. Multi-row
//! writes validate everything up front and mutate while holding the write
//! lock, so each operation is atomic with respect to every other caller.
//! Suitable for tests and ephemeral ledgers.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use uuid::Uuid;

use ledgerkit_core::{Account, JournalEntry, LedgerError, LedgerStore};

#[derive(Clone, Default)]
struct TenantData {
    accounts: BTreeMap<Uuid, Account>,
    entries: BTreeMap<Uuid, JournalEntry>,
    reference_seq: u64,
}

pub struct MemoryStore {
    tenants: RwLock<BTreeMap<Arc<str>, TenantData>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(BTreeMap::new()),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn create_tenant(&self, tenant: &str) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let key: Arc<str> = Arc::from(tenant);
        if tenants.contains_key(&key) {
            return Err(LedgerError::TenantAlreadyExists(tenant.to_string()));
        }
        tenants.insert(key, TenantData::default());
        Ok(())
    }

    fn tenant_exists(&self, tenant: &str) -> bool {
        self.tenants.read().unwrap().contains_key(tenant)
    }

    fn list_tenants(&self) -> Vec<Arc<str>> {
        self.tenants.read().unwrap().keys().cloned().collect()
    }

    fn insert_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        if data.accounts.values().any(|a| a.code == account.code) {
            return Err(LedgerError::DuplicateCode(account.code.clone()));
        }
        data.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn get_account(&self, tenant: &str, id: Uuid) -> Result<Account, LedgerError> {
        let tenants = self.tenants.read().unwrap();
        let data = tenants
            .get(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        data.accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    fn list_accounts(&self, tenant: &str) -> Result<Vec<Account>, LedgerError> {
        let tenants = self.tenants.read().unwrap();
        let data = tenants
            .get(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        let mut accounts: Vec<Account> = data.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    fn update_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        if !data.accounts.contains_key(&account.id) {
            return Err(LedgerError::AccountNotFound(account.id.to_string()));
        }
        if data
            .accounts
            .values()
            .any(|a| a.id != account.id && a.code == account.code)
        {
            return Err(LedgerError::DuplicateCode(account.code.clone()));
        }
        data.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn delete_account(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        if !data.accounts.contains_key(&id) {
            return Err(LedgerError::AccountNotFound(id.to_string()));
        }
        let referenced = data
            .entries
            .values()
            .any(|e| e.lines.iter().any(|l| l.account_id == id));
        if referenced {
            return Err(LedgerError::AccountInUse(id.to_string()));
        }
        data.accounts.remove(&id);
        Ok(())
    }

    fn insert_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;

        // Verify every referenced account before mutating anything.
        for line in &entry.lines {
            if !data.accounts.contains_key(&line.account_id) {
                return Err(LedgerError::AccountNotFound(line.account_id.to_string()));
            }
        }

        for line in &entry.lines {
            let account = data.accounts.get_mut(&line.account_id).unwrap();
            account.balance += line.delta_for(account.kind);
        }
        data.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn get_entry(&self, tenant: &str, id: Uuid) -> Result<JournalEntry, LedgerError> {
        let tenants = self.tenants.read().unwrap();
        let data = tenants
            .get(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        data.entries
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))
    }

    fn list_entries(&self, tenant: &str) -> Result<Vec<JournalEntry>, LedgerError> {
        let tenants = self.tenants.read().unwrap();
        let data = tenants
            .get(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        let mut entries: Vec<JournalEntry> = data.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(entries)
    }

    fn replace_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        if !data.entries.contains_key(&entry.id) {
            return Err(LedgerError::EntryNotFound(entry.id.to_string()));
        }

        // Verify the replacement lines before touching any balance.
        for line in &entry.lines {
            if !data.accounts.contains_key(&line.account_id) {
                return Err(LedgerError::AccountNotFound(line.account_id.to_string()));
            }
        }

        let old = data.entries.insert(entry.id, entry.clone()).unwrap();
        for line in &old.lines {
            if let Some(account) = data.accounts.get_mut(&line.account_id) {
                account.balance -= line.delta_for(account.kind);
            }
        }
        for line in &entry.lines {
            let account = data.accounts.get_mut(&line.account_id).unwrap();
            account.balance += line.delta_for(account.kind);
        }
        Ok(())
    }

    fn remove_entry(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        let entry = data
            .entries
            .remove(&id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        for line in &entry.lines {
            if let Some(account) = data.accounts.get_mut(&line.account_id) {
                account.balance -= line.delta_for(account.kind);
            }
        }
        Ok(())
    }

    fn next_reference(&self, tenant: &str) -> Result<u64, LedgerError> {
        let mut tenants = self.tenants.write().unwrap();
        let data = tenants
            .get_mut(tenant)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant.to_string()))?;
        data.reference_seq += 1;
        Ok(data.reference_seq)
    }
}
