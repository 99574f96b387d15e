//! SQLite `LedgerStore` backend.
//!
//! One connection behind a mutex; multi-row writes run inside savepoints so
//! `insert_entry`, `replace_entry` and `remove_entry` commit entirely or
//! not at all. The
//! schema carries the referential rules the core relies on: lines cascade
//! with their entry, accounts refuse deletion while lines reference them.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use ledgerkit_core::{
    Account, AccountKind, JournalEntry, JournalLine, LedgerError, LedgerStore,
};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self, LedgerError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tenants (
                id TEXT PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL REFERENCES tenants(id),
                code TEXT NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                balance TEXT NOT NULL,
                UNIQUE (tenant_id, code)
            );

            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL REFERENCES tenants(id),
                date TEXT NOT NULL,
                reference TEXT NOT NULL,
                description TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS journal_lines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_id TEXT NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
                account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
                description TEXT,
                debit TEXT NOT NULL,
                credit TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_tenant_code
                ON accounts(tenant_id, code);

            CREATE INDEX IF NOT EXISTS idx_entries_tenant_date
                ON journal_entries(tenant_id, date);

            CREATE INDEX IF NOT EXISTS idx_lines_entry
                ON journal_lines(entry_id);

            CREATE INDEX IF NOT EXISTS idx_lines_account
                ON journal_lines(account_id);

            CREATE TABLE IF NOT EXISTS tenant_sequences (
                tenant_id TEXT PRIMARY KEY REFERENCES tenants(id),
                value INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(())
    }

    fn ensure_tenant(conn: &Connection, tenant: &str) -> Result<(), LedgerError> {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM tenants WHERE id = ?1",
                params![tenant],
                |row| row.get(0),
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        if !exists {
            return Err(LedgerError::TenantNotFound(tenant.to_string()));
        }
        Ok(())
    }

    fn load_account(conn: &Connection, tenant: &str, id: Uuid) -> Result<Account, LedgerError> {
        let row = conn
            .query_row(
                "SELECT id, code, name, kind, balance FROM accounts
                 WHERE tenant_id = ?1 AND id = ?2",
                params![tenant, id.to_string()],
                account_from_row,
            )
            .optional()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        match row {
            Some(account) => account,
            None => Err(LedgerError::AccountNotFound(id.to_string())),
        }
    }

    fn load_lines(conn: &Connection, entry_id: &str) -> Result<Vec<JournalLine>, LedgerError> {
        let mut stmt = conn
            .prepare(
                "SELECT account_id, description, debit, credit FROM journal_lines
                 WHERE entry_id = ?1 ORDER BY id",
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params![entry_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let mut lines = Vec::new();
        for row in rows {
            let (account_id, description, debit, credit) =
                row.map_err(|e| LedgerError::Storage(e.to_string()))?;
            lines.push(JournalLine {
                account_id: parse_uuid(&account_id)?,
                description,
                debit: parse_decimal(&debit)?,
                credit: parse_decimal(&credit)?,
            });
        }
        Ok(lines)
    }

    /// Applies (or reverses) a line's effect on the referenced account with
    /// a read-modify-write, signed per the account's natural-balance side.
    /// The caller holds the connection lock and an enclosing savepoint.
    fn apply_line(
        conn: &Connection,
        tenant: &str,
        line: &JournalLine,
        reverse: bool,
    ) -> Result<(), LedgerError> {
        let account = Self::load_account(conn, tenant, line.account_id)?;
        let delta = line.delta_for(account.kind);
        let balance = if reverse {
            account.balance - delta
        } else {
            account.balance + delta
        };
        conn.execute(
            "UPDATE accounts SET balance = ?1 WHERE tenant_id = ?2 AND id = ?3",
            params![balance.to_string(), tenant, line.account_id.to_string()],
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(())
    }

    fn insert_entry_inner(
        conn: &Connection,
        tenant: &str,
        entry: &JournalEntry,
    ) -> Result<(), LedgerError> {
        conn.execute(
            "INSERT INTO journal_entries (id, tenant_id, date, reference, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id.to_string(),
                tenant,
                date_to_str(entry.date),
                entry.reference,
                entry.description,
                entry.created_at.unix_timestamp(),
            ],
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        for line in &entry.lines {
            Self::apply_line(conn, tenant, line, false)?;
            conn.execute(
                "INSERT INTO journal_lines (entry_id, account_id, description, debit, credit)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.id.to_string(),
                    line.account_id.to_string(),
                    line.description,
                    line.debit.to_string(),
                    line.credit.to_string(),
                ],
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        }

        Ok(())
    }

    fn remove_entry_inner(
        conn: &Connection,
        tenant: &str,
        id: Uuid,
    ) -> Result<(), LedgerError> {
        let id_str = id.to_string();
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM journal_entries WHERE tenant_id = ?1 AND id = ?2",
                params![tenant, id_str],
                |row| row.get(0),
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        if !exists {
            return Err(LedgerError::EntryNotFound(id_str));
        }

        let lines = Self::load_lines(conn, &id_str)?;
        for line in &lines {
            Self::apply_line(conn, tenant, line, true)?;
        }

        // Lines go with the entry via ON DELETE CASCADE.
        conn.execute(
            "DELETE FROM journal_entries WHERE tenant_id = ?1 AND id = ?2",
            params![tenant, id_str],
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Runs `f` inside a named savepoint, rolling the savepoint back when it
    /// fails so partial multi-row writes never become visible.
    fn with_savepoint<T>(
        conn: &Connection,
        f: impl FnOnce(&Connection) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        conn.execute_batch("SAVEPOINT ledger_write")
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        match f(conn) {
            Ok(value) => {
                conn.execute_batch("RELEASE SAVEPOINT ledger_write")
                    .map_err(|e| LedgerError::Storage(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                let _ = conn.execute_batch(
                    "ROLLBACK TO SAVEPOINT ledger_write; RELEASE SAVEPOINT ledger_write",
                );
                Err(e)
            }
        }
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn date_to_str(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())
}

fn str_to_date(s: &str) -> Result<Date, LedgerError> {
    let corrupt = || LedgerError::Storage(format!("corrupt date in storage: {s}"));
    // BCE years carry a leading sign that must not be taken for a separator.
    let (rest, sign) = match s.strip_prefix('-') {
        Some(rest) => (rest, -1),
        None => (s, 1),
    };
    let mut parts = rest.splitn(3, '-');
    let year = parts.next().and_then(|p| p.parse::<i32>().ok()).ok_or_else(corrupt)?;
    let month = parts.next().and_then(|p| p.parse::<u8>().ok()).ok_or_else(corrupt)?;
    let day = parts.next().and_then(|p| p.parse::<u8>().ok()).ok_or_else(corrupt)?;
    let month = Month::try_from(month).map_err(|_| corrupt())?;
    Date::from_calendar_date(sign * year, month, day).map_err(|_| corrupt())
}

fn parse_decimal(s: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(s).map_err(|e| LedgerError::Storage(format!("corrupt amount in storage: {e}")))
}

fn parse_uuid(s: &str) -> Result<Uuid, LedgerError> {
    Uuid::parse_str(s).map_err(|e| LedgerError::Storage(format!("corrupt id in storage: {e}")))
}

fn account_from_row(row: &rusqlite::Row) -> rusqlite::Result<Result<Account, LedgerError>> {
    let id: String = row.get(0)?;
    let code: String = row.get(1)?;
    let name: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let balance: String = row.get(4)?;

    Ok((|| {
        Ok(Account {
            id: parse_uuid(&id)?,
            code,
            name,
            kind: kind.parse::<AccountKind>()?,
            balance: parse_decimal(&balance)?,
        })
    })())
}

impl LedgerStore for SqliteStore {
    fn create_tenant(&self, tenant: &str) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO tenants (id) VALUES (?1)", params![tenant])
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    LedgerError::TenantAlreadyExists(tenant.to_string())
                } else {
                    LedgerError::Storage(e.to_string())
                }
            })?;
        Ok(())
    }

    fn tenant_exists(&self, tenant: &str) -> bool {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM tenants WHERE id = ?1",
            params![tenant],
            |row| row.get(0),
        )
        .unwrap_or(false)
    }

    fn list_tenants(&self) -> Vec<Arc<str>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = match conn.prepare("SELECT id FROM tenants ORDER BY id") {
            Ok(stmt) => stmt,
            Err(_) => return Vec::new(),
        };
        let rows = match stmt.query_map([], |row| row.get::<_, String>(0)) {
            Ok(rows) => rows,
            Err(_) => return Vec::new(),
        };
        rows.filter_map(|r| r.ok().map(|id| Arc::from(id.as_str())))
            .collect()
    }

    fn insert_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        conn.execute(
            "INSERT INTO accounts (id, tenant_id, code, name, kind, balance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id.to_string(),
                tenant,
                account.code,
                account.name,
                account.kind.as_str(),
                account.balance.to_string(),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                LedgerError::DuplicateCode(account.code.clone())
            } else {
                LedgerError::Storage(e.to_string())
            }
        })?;
        Ok(())
    }

    fn get_account(&self, tenant: &str, id: Uuid) -> Result<Account, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        Self::load_account(&conn, tenant, id)
    }

    fn list_accounts(&self, tenant: &str) -> Result<Vec<Account>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, code, name, kind, balance FROM accounts
                 WHERE tenant_id = ?1 ORDER BY code",
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params![tenant], account_from_row)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(row.map_err(|e| LedgerError::Storage(e.to_string()))??);
        }
        Ok(accounts)
    }

    fn update_account(&self, tenant: &str, account: &Account) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        let updated = conn
            .execute(
                "UPDATE accounts SET code = ?1, name = ?2, kind = ?3, balance = ?4
                 WHERE tenant_id = ?5 AND id = ?6",
                params![
                    account.code,
                    account.name,
                    account.kind.as_str(),
                    account.balance.to_string(),
                    tenant,
                    account.id.to_string(),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    LedgerError::DuplicateCode(account.code.clone())
                } else {
                    LedgerError::Storage(e.to_string())
                }
            })?;
        if updated == 0 {
            return Err(LedgerError::AccountNotFound(account.id.to_string()));
        }
        Ok(())
    }

    fn delete_account(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        let deleted = conn
            .execute(
                "DELETE FROM accounts WHERE tenant_id = ?1 AND id = ?2",
                params![tenant, id.to_string()],
            )
            .map_err(|e| {
                // ON DELETE RESTRICT from journal_lines fires here.
                if is_constraint_violation(&e) {
                    LedgerError::AccountInUse(id.to_string())
                } else {
                    LedgerError::Storage(e.to_string())
                }
            })?;
        if deleted == 0 {
            return Err(LedgerError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }

    fn insert_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        Self::with_savepoint(&conn, |conn| Self::insert_entry_inner(conn, tenant, entry))
    }

    fn get_entry(&self, tenant: &str, id: Uuid) -> Result<JournalEntry, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        let id_str = id.to_string();
        let row = conn
            .query_row(
                "SELECT date, reference, description, created_at FROM journal_entries
                 WHERE tenant_id = ?1 AND id = ?2",
                params![tenant, id_str],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let (date, reference, description, created_at) =
            row.ok_or(LedgerError::EntryNotFound(id_str.clone()))?;

        Ok(JournalEntry {
            id,
            date: str_to_date(&date)?,
            reference,
            description,
            lines: Self::load_lines(&conn, &id_str)?,
            created_at: OffsetDateTime::from_unix_timestamp(created_at)
                .map_err(|e| LedgerError::Storage(format!("corrupt timestamp in storage: {e}")))?,
        })
    }

    fn list_entries(&self, tenant: &str) -> Result<Vec<JournalEntry>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, reference, description, created_at FROM journal_entries
                 WHERE tenant_id = ?1 ORDER BY date DESC, created_at DESC",
            )
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params![tenant], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, date, reference, description, created_at) =
                row.map_err(|e| LedgerError::Storage(e.to_string()))?;
            entries.push(JournalEntry {
                id: parse_uuid(&id)?,
                date: str_to_date(&date)?,
                reference,
                description,
                lines: Self::load_lines(&conn, &id)?,
                created_at: OffsetDateTime::from_unix_timestamp(created_at).map_err(|e| {
                    LedgerError::Storage(format!("corrupt timestamp in storage: {e}"))
                })?,
            });
        }
        Ok(entries)
    }

    fn replace_entry(&self, tenant: &str, entry: &JournalEntry) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        Self::with_savepoint(&conn, |conn| {
            Self::remove_entry_inner(conn, tenant, entry.id)?;
            Self::insert_entry_inner(conn, tenant, entry)
        })
    }

    fn remove_entry(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        Self::with_savepoint(&conn, |conn| Self::remove_entry_inner(conn, tenant, id))
    }

    fn next_reference(&self, tenant: &str) -> Result<u64, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_tenant(&conn, tenant)?;
        conn.execute(
            "INSERT INTO tenant_sequences (tenant_id, value) VALUES (?1, 0)
             ON CONFLICT (tenant_id) DO NOTHING",
            params![tenant],
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
        conn.execute(
            "UPDATE tenant_sequences SET value = value + 1 WHERE tenant_id = ?1",
            params![tenant],
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
        conn.query_row(
            "SELECT value FROM tenant_sequences WHERE tenant_id = ?1",
            params![tenant],
            |row| row.get(0),
        )
        .map_err(|e| LedgerError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(code: &str, kind: AccountKind) -> Account {
        Account {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: code.to_string(),
            kind,
            balance: Decimal::ZERO,
        }
    }

    fn entry(lines: Vec<JournalLine>) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            date: Date::from_calendar_date(2024, Month::March, 1).unwrap(),
            reference: "JV-000001".to_string(),
            description: Some("test entry".to_string()),
            lines,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn debit(account_id: Uuid, amount: Decimal) -> JournalLine {
        JournalLine {
            account_id,
            description: None,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    fn credit(account_id: Uuid, amount: Decimal) -> JournalLine {
        JournalLine {
            account_id,
            description: None,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    #[test]
    fn entry_round_trip_adjusts_balances() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        let cash = account("1101", AccountKind::Asset);
        let sales = account("4101", AccountKind::Revenue);
        store.insert_account("acme", &cash).unwrap();
        store.insert_account("acme", &sales).unwrap();

        let e = entry(vec![debit(cash.id, dec!(500)), credit(sales.id, dec!(500))]);
        store.insert_entry("acme", &e).unwrap();

        assert_eq!(store.get_account("acme", cash.id).unwrap().balance, dec!(500));
        assert_eq!(
            store.get_account("acme", sales.id).unwrap().balance,
            dec!(500)
        );

        let loaded = store.get_entry("acme", e.id).unwrap();
        assert_eq!(loaded.reference, "JV-000001");
        assert_eq!(loaded.lines.len(), 2);
        assert_eq!(loaded.date, e.date);

        store.remove_entry("acme", e.id).unwrap();
        assert_eq!(
            store.get_account("acme", cash.id).unwrap().balance,
            Decimal::ZERO
        );
    }

    #[test]
    fn insert_entry_with_unknown_account_rolls_back() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        let cash = account("1101", AccountKind::Asset);
        store.insert_account("acme", &cash).unwrap();

        let err = store
            .insert_entry(
                "acme",
                &entry(vec![
                    debit(cash.id, dec!(500)),
                    credit(Uuid::new_v4(), dec!(500)),
                ]),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert_eq!(
            store.get_account("acme", cash.id).unwrap().balance,
            Decimal::ZERO
        );
        assert!(store.list_entries("acme").unwrap().is_empty());
    }

    #[test]
    fn duplicate_code_maps_to_constraint_violation() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        store.create_tenant("globex").unwrap();

        store
            .insert_account("acme", &account("1101", AccountKind::Asset))
            .unwrap();
        assert!(matches!(
            store.insert_account("acme", &account("1101", AccountKind::Asset)),
            Err(LedgerError::DuplicateCode(_))
        ));
        // Same code in another tenant is fine.
        store
            .insert_account("globex", &account("1101", AccountKind::Asset))
            .unwrap();
    }

    #[test]
    fn restrict_fk_blocks_referenced_account_deletion() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        let cash = account("1101", AccountKind::Asset);
        let sales = account("4101", AccountKind::Revenue);
        store.insert_account("acme", &cash).unwrap();
        store.insert_account("acme", &sales).unwrap();
        store
            .insert_entry(
                "acme",
                &entry(vec![debit(cash.id, dec!(10)), credit(sales.id, dec!(10))]),
            )
            .unwrap();

        assert!(matches!(
            store.delete_account("acme", cash.id),
            Err(LedgerError::AccountInUse(_))
        ));
    }

    #[test]
    fn replace_entry_swaps_balance_effects_atomically() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        let cash = account("1101", AccountKind::Asset);
        let bank = account("1102", AccountKind::Asset);
        let sales = account("4101", AccountKind::Revenue);
        store.insert_account("acme", &cash).unwrap();
        store.insert_account("acme", &bank).unwrap();
        store.insert_account("acme", &sales).unwrap();

        let mut e = entry(vec![debit(cash.id, dec!(300)), credit(sales.id, dec!(300))]);
        store.insert_entry("acme", &e).unwrap();

        e.lines = vec![debit(bank.id, dec!(300)), credit(sales.id, dec!(300))];
        store.replace_entry("acme", &e).unwrap();

        assert_eq!(
            store.get_account("acme", cash.id).unwrap().balance,
            Decimal::ZERO
        );
        assert_eq!(store.get_account("acme", bank.id).unwrap().balance, dec!(300));
        assert_eq!(store.get_entry("acme", e.id).unwrap().lines.len(), 2);
    }

    #[test]
    fn failed_replace_rolls_back_without_touching_other_entries() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        let cash = account("1101", AccountKind::Asset);
        let sales = account("4101", AccountKind::Revenue);
        store.insert_account("acme", &cash).unwrap();
        store.insert_account("acme", &sales).unwrap();

        let other = entry(vec![debit(cash.id, dec!(500)), credit(sales.id, dec!(500))]);
        store.insert_entry("acme", &other).unwrap();

        let mut e = entry(vec![debit(cash.id, dec!(75)), credit(sales.id, dec!(75))]);
        store.insert_entry("acme", &e).unwrap();

        e.lines = vec![debit(Uuid::new_v4(), dec!(75)), credit(sales.id, dec!(75))];
        let err = store.replace_entry("acme", &e).unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));

        assert_eq!(
            store.get_account("acme", cash.id).unwrap().balance,
            dec!(575)
        );
        assert_eq!(store.get_entry("acme", other.id).unwrap().lines.len(), 2);
        assert_eq!(
            store.get_entry("acme", e.id).unwrap().lines[0].account_id,
            cash.id
        );
    }

    #[test]
    fn dates_round_trip_through_text_storage() {
        for (year, month, day) in [(2024, Month::March, 1), (1, Month::January, 31), (-44, Month::July, 9)] {
            let date = Date::from_calendar_date(year, month, day).unwrap();
            assert_eq!(str_to_date(&date_to_str(date)).unwrap(), date);
        }
    }

    #[test]
    fn sequence_is_per_tenant_and_monotonic() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.create_tenant("acme").unwrap();
        store.create_tenant("globex").unwrap();

        assert_eq!(store.next_reference("acme").unwrap(), 1);
        assert_eq!(store.next_reference("acme").unwrap(), 2);
        assert_eq!(store.next_reference("globex").unwrap(), 1);
    }
}
