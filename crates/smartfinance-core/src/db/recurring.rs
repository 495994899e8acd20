//! Recurring transaction rules and occurrence generation
//!
//! Materializing an occurrence and advancing `last_generated` always happen
//! in one SQLite transaction, so a rule can never be advanced without its
//! transaction being stored (or the reverse).

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{parse_date_column, parse_datetime, parse_enum_column, Database};
use crate::error::{Error, Result};
use crate::models::{
    NewRecurringTransaction, RecurringTransaction, RecurringUpdate, RecurringWithNext, Transaction,
};
use crate::schedule;

const SELECT_COLUMNS: &str = "id, user_id, transaction_type, category, amount, description, \
     frequency, start_date, end_date, last_generated, is_active, created_at";

impl Database {
    /// Create a recurring rule
    pub fn create_recurring(
        &self,
        user_id: i64,
        rule: &NewRecurringTransaction,
    ) -> Result<RecurringTransaction> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring_transactions
                (user_id, transaction_type, category, amount, description, frequency, start_date, end_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                rule.transaction_type.as_str(),
                rule.category,
                rule.amount,
                rule.description,
                rule.frequency.as_str(),
                rule.start_date.to_string(),
                rule.end_date.map(|d| d.to_string()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_recurring(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("recurring transaction {}", id)))
    }

    /// Get a single rule owned by the user
    pub fn get_recurring(&self, user_id: i64, id: i64) -> Result<Option<RecurringTransaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM recurring_transactions WHERE id = ? AND user_id = ?",
            SELECT_COLUMNS
        );
        let rule = conn
            .query_row(&sql, params![id, user_id], Self::row_to_recurring)
            .optional()?;
        Ok(rule)
    }

    /// List a user's rules, most recent start date first
    pub fn list_recurring(&self, user_id: i64) -> Result<Vec<RecurringTransaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM recurring_transactions WHERE user_id = ? ORDER BY start_date DESC, id DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rules = stmt
            .query_map(params![user_id], Self::row_to_recurring)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    /// List rules with their projected next date (None for inactive rules)
    pub fn list_recurring_with_next(&self, user_id: i64) -> Result<Vec<RecurringWithNext>> {
        Ok(self
            .list_recurring(user_id)?
            .into_iter()
            .map(with_next_date)
            .collect())
    }

    /// Apply an edit to a rule; the caller has validated it against the stored start date
    pub fn update_recurring(
        &self,
        user_id: i64,
        id: i64,
        update: &RecurringUpdate,
    ) -> Result<RecurringTransaction> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE recurring_transactions
            SET amount = ?, description = ?, frequency = ?, end_date = ?, is_active = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                update.amount,
                update.description,
                update.frequency.as_str(),
                update.end_date.map(|d| d.to_string()),
                update.is_active,
                id,
                user_id,
            ],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("recurring transaction {}", id)));
        }
        self.get_recurring(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("recurring transaction {}", id)))
    }

    /// Delete a rule; transactions it already generated are kept
    pub fn delete_recurring(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM recurring_transactions WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("recurring transaction {}", id)));
        }
        Ok(())
    }

    /// Materialize the next occurrence of a rule right now
    pub fn generate_now(&self, user_id: i64, id: i64) -> Result<Transaction> {
        let rule = self
            .get_recurring(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("recurring transaction {}", id)))?;

        if !rule.is_active {
            return Err(Error::Validation(
                "This recurring transaction is inactive.".to_string(),
            ));
        }

        let target = schedule::next_occurrence(&rule, None);
        match self.materialize_and_advance(&rule, target)? {
            Some(tx) => {
                info!(user_id, recurring_id = id, date = %tx.date, "Generated recurring transaction");
                Ok(tx)
            }
            None => Err(Error::Validation(
                "This recurring transaction has ended.".to_string(),
            )),
        }
    }

    /// Materialize every occurrence due on or before `today` for all active rules
    ///
    /// Each rule is caught up until its next occurrence is in the future or past
    /// its end date. Returns the generated transactions in generation order.
    pub fn generate_due(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Transaction>> {
        let mut generated = Vec::new();

        for mut rule in self.list_recurring(user_id)? {
            if !rule.is_active {
                continue;
            }

            // next_occurrence strictly advances, so this terminates at `today`
            loop {
                let target = schedule::next_occurrence(&rule, None);
                if target > today {
                    break;
                }
                match self.materialize_and_advance(&rule, target)? {
                    Some(tx) => {
                        rule.last_generated = Some(target);
                        generated.push(tx);
                    }
                    None => break,
                }
            }
        }

        if !generated.is_empty() {
            info!(user_id, count = generated.len(), "Generated due recurring transactions");
        }
        Ok(generated)
    }

    /// Insert the occurrence for `target` and advance `last_generated`, atomically
    fn materialize_and_advance(
        &self,
        rule: &RecurringTransaction,
        target: NaiveDate,
    ) -> Result<Option<Transaction>> {
        let Some(new_tx) = schedule::materialize(rule, target) else {
            debug!(recurring_id = rule.id, date = %target, "Rule has ended");
            return Ok(None);
        };

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let tx_id = Self::insert_transaction_with(&db_tx, rule.user_id, &new_tx)?;
        db_tx.execute(
            "UPDATE recurring_transactions SET last_generated = ? WHERE id = ? AND user_id = ?",
            params![target.to_string(), rule.id, rule.user_id],
        )?;
        db_tx.commit()?;
        drop(conn);

        self.get_transaction(rule.user_id, tx_id)
    }

    fn row_to_recurring(row: &rusqlite::Row) -> rusqlite::Result<RecurringTransaction> {
        let type_str: String = row.get(2)?;
        let frequency: String = row.get(6)?;
        let start_date: String = row.get(7)?;
        let end_date: Option<String> = row.get(8)?;
        let last_generated: Option<String> = row.get(9)?;
        let created_at: String = row.get(11)?;
        Ok(RecurringTransaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            transaction_type: parse_enum_column(2, &type_str)?,
            category: row.get(3)?,
            amount: row.get(4)?,
            description: row.get(5)?,
            frequency: parse_enum_column(6, &frequency)?,
            start_date: parse_date_column(7, &start_date)?,
            end_date: end_date.map(|d| parse_date_column(8, &d)).transpose()?,
            last_generated: last_generated
                .map(|d| parse_date_column(9, &d))
                .transpose()?,
            is_active: row.get(10)?,
            created_at: parse_datetime(&created_at),
        })
    }
}

fn with_next_date(recurring: RecurringTransaction) -> RecurringWithNext {
    let next_date = recurring
        .is_active
        .then(|| schedule::next_occurrence(&recurring, None));
    RecurringWithNext {
        recurring,
        next_date,
    }
}
