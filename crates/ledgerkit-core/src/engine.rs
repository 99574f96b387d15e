use std::sync::Arc;

use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::write::{EntryPatch, PostEntry};
use crate::models::{JournalEntry, JournalLine};
use crate::storage::{LedgerError, LedgerStore};
use crate::BALANCE_TOLERANCE;

/// Validates a candidate line set and returns the debit and credit totals.
///
/// Rejects empty sets, negative amounts, lines carrying both a debit and a
/// credit, and sets whose totals differ by more than the tolerance.
pub fn validate_lines(lines: &[JournalLine]) -> Result<(Decimal, Decimal), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;

    for line in lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err(LedgerError::DebitAndCredit);
        }
        debits += line.debit;
        credits += line.credit;
    }

    if (debits - credits).abs() > BALANCE_TOLERANCE {
        return Err(LedgerError::Unbalanced { debits, credits });
    }

    Ok((debits, credits))
}

/// Validates and commits journal entries against the account registry,
/// adjusting running balances. Every call either commits entirely or leaves
/// all state untouched; nothing is retried internally.
pub struct PostingEngine {
    store: Arc<dyn LedgerStore>,
}

impl PostingEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Posts a balanced entry and applies each line's effect to the
    /// referenced account's balance.
    pub fn post_entry(&self, tenant: &str, cmd: PostEntry) -> Result<JournalEntry, LedgerError> {
        let (debits, credits) = validate_lines(&cmd.lines)?;

        let reference = match cmd.reference {
            Some(reference) => reference,
            None => format!("JV-{:06}", self.store.next_reference(tenant)?),
        };

        let entry = JournalEntry {
            id: Uuid::new_v4(),
            date: cmd.date,
            reference,
            description: cmd.description,
            lines: cmd.lines,
            created_at: OffsetDateTime::now_utc(),
        };

        self.store.insert_entry(tenant, &entry)?;
        tracing::info!(tenant, entry = %entry.id, reference = %entry.reference, %debits, %credits, "journal entry posted");
        Ok(entry)
    }

    pub fn get_entry(&self, tenant: &str, id: Uuid) -> Result<JournalEntry, LedgerError> {
        self.store.get_entry(tenant, id)
    }

    pub fn list_entries(&self, tenant: &str) -> Result<Vec<JournalEntry>, LedgerError> {
        self.store.list_entries(tenant)
    }

    /// Replaces an entry, reversing the old lines' balance effect and
    /// applying the new lines', equivalent to delete-and-recreate with a
    /// stable id. The merged line set is validated before anything is
    /// touched, so a rejected edit leaves the original entry intact.
    pub fn edit_entry(
        &self,
        tenant: &str,
        id: Uuid,
        patch: EntryPatch,
    ) -> Result<JournalEntry, LedgerError> {
        let old = self.store.get_entry(tenant, id)?;

        let updated = JournalEntry {
            id: old.id,
            date: patch.date.unwrap_or(old.date),
            reference: patch.reference.unwrap_or_else(|| old.reference.clone()),
            description: patch.description.or_else(|| old.description.clone()),
            lines: patch.lines.unwrap_or_else(|| old.lines.clone()),
            created_at: old.created_at,
        };

        let (debits, credits) = validate_lines(&updated.lines)?;

        self.store.replace_entry(tenant, &updated)?;
        tracing::info!(tenant, entry = %id, %debits, %credits, "journal entry replaced");
        Ok(updated)
    }

    /// Reverses the balance effect of every line and removes the entry and
    /// its lines atomically.
    pub fn delete_entry(&self, tenant: &str, id: Uuid) -> Result<(), LedgerError> {
        self.store.remove_entry(tenant, id)?;
        tracing::info!(tenant, entry = %id, "journal entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            account_id: Uuid::new_v4(),
            description: None,
            debit,
            credit,
        }
    }

    #[test]
    fn balanced_lines_pass_validation() {
        let lines = vec![line(dec!(500), dec!(0)), line(dec!(0), dec!(500))];
        let (debits, credits) = validate_lines(&lines).unwrap();
        assert_eq!(debits, dec!(500));
        assert_eq!(credits, dec!(500));
    }

    #[test]
    fn imbalance_within_tolerance_passes() {
        let lines = vec![line(dec!(500.00), dec!(0)), line(dec!(0), dec!(499.99))];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn imbalance_beyond_tolerance_is_rejected() {
        let lines = vec![line(dec!(500), dec!(0)), line(dec!(0), dec!(480))];
        match validate_lines(&lines).unwrap_err() {
            LedgerError::Unbalanced { debits, credits } => {
                assert_eq!(debits, dec!(500));
                assert_eq!(credits, dec!(480));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_line_set_is_rejected() {
        assert!(matches!(validate_lines(&[]), Err(LedgerError::EmptyEntry)));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let lines = vec![line(dec!(-10), dec!(0)), line(dec!(0), dec!(-10))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn line_with_both_sides_is_rejected() {
        let lines = vec![line(dec!(10), dec!(10))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::DebitAndCredit)
        ));
    }
}
