//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::transaction_filter::TransactionFilter;
use super::{parse_date_column, parse_datetime, parse_enum_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

const SELECT_COLUMNS: &str =
    "id, user_id, transaction_type, category, amount, description, date, created_at";

impl Database {
    /// Insert a transaction for a user, returning its ID
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;
        Self::insert_transaction_with(&conn, user_id, tx)
    }

    /// Insert on an existing connection (used inside SQLite transactions)
    pub(crate) fn insert_transaction_with(
        conn: &rusqlite::Connection,
        user_id: i64,
        tx: &NewTransaction,
    ) -> Result<i64> {
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, transaction_type, category, amount, description, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.transaction_type.as_str(),
                tx.category,
                tx.amount,
                tx.description,
                tx.date.to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert and return the stored transaction
    pub fn create_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        let id = self.insert_transaction(user_id, tx)?;
        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        // SQLite treats a negative LIMIT as unbounded
        let transactions = stmt
            .query_map(params![user_id, limit.unwrap_or(-1)], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List transactions matching a filter, newest first
    pub fn query_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            "SELECT {} FROM transactions t {} ORDER BY t.date DESC, t.id DESC",
            SELECT_COLUMNS, built.where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(built.param_refs().as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Get a single transaction owned by the user
    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
            SELECT_COLUMNS
        );
        let transaction = conn
            .query_row(&sql, params![id, user_id], Self::row_to_transaction)
            .optional()?;
        Ok(transaction)
    }

    /// Replace every editable field of a transaction
    pub fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        tx: &NewTransaction,
    ) -> Result<Transaction> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET transaction_type = ?, category = ?, amount = ?, description = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                tx.transaction_type.as_str(),
                tx.category,
                tx.amount,
                tx.description,
                tx.date.to_string(),
                id,
                user_id,
            ],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Delete a transaction owned by the user
    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }

    /// Distinct categories a user has recorded, alphabetically
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT category FROM transactions WHERE user_id = ? ORDER BY category",
        )?;
        let categories = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(categories)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let type_str: String = row.get(2)?;
        let date_str: String = row.get(6)?;
        let created_at_str: String = row.get(7)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            transaction_type: parse_enum_column(2, &type_str)?,
            category: row.get(3)?,
            amount: row.get(4)?,
            description: row.get(5)?,
            date: parse_date_column(6, &date_str)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
