//! Aggregated reads backing the insight engine and budget evaluator

use rusqlite::params;

use super::transaction_filter::TransactionFilter;
use super::Database;
use crate::error::Result;
use crate::ledger::{sort_category_totals, LedgerReader};
use crate::models::{CategoryTotal, DateRange, MonthTotal, TransactionType};

impl LedgerReader for Database {
    fn total_by_type(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<f64> {
        let filter = TransactionFilter::for_user(user_id)
            .transaction_type(Some(transaction_type))
            .date_range(range)
            .build();

        let conn = self.conn()?;
        let sql = format!(
            "SELECT COALESCE(SUM(t.amount), 0) FROM transactions t {}",
            filter.where_clause
        );
        let total: f64 = conn.query_row(&sql, filter.param_refs().as_slice(), |row| row.get(0))?;
        Ok(total)
    }

    fn sum_by_category(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<Vec<CategoryTotal>> {
        let filter = TransactionFilter::for_user(user_id)
            .transaction_type(Some(transaction_type))
            .date_range(range)
            .build();

        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT t.category, SUM(t.amount) AS total
            FROM transactions t
            {}
            GROUP BY t.category
            ORDER BY total DESC, t.category ASC
            "#,
            filter.where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut totals = stmt
            .query_map(filter.param_refs().as_slice(), |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Same ordering as the in-memory reader, independent of SQLite float summation
        sort_category_totals(&mut totals);
        Ok(totals)
    }

    fn sum_category(
        &self,
        user_id: i64,
        category: &str,
        transaction_type: TransactionType,
        range: DateRange,
    ) -> Result<f64> {
        let filter = TransactionFilter::for_user(user_id)
            .transaction_type(Some(transaction_type))
            .category(Some(category))
            .date_range(Some(range))
            .build();

        let conn = self.conn()?;
        let sql = format!(
            "SELECT COALESCE(SUM(t.amount), 0) FROM transactions t {}",
            filter.where_clause
        );
        let total: f64 = conn.query_row(&sql, filter.param_refs().as_slice(), |row| row.get(0))?;
        Ok(total)
    }

    fn count_transactions(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn sum_by_month_of_year(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
    ) -> Result<Vec<MonthTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT CAST(strftime('%m', date) AS INTEGER) AS month, SUM(amount)
            FROM transactions
            WHERE user_id = ? AND transaction_type = ?
            GROUP BY month
            ORDER BY month
            "#,
        )?;
        let months = stmt
            .query_map(params![user_id, transaction_type.as_str()], |row| {
                Ok(MonthTotal {
                    month: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(months)
    }
}
