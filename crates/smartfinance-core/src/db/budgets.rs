//! Budget operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, parse_enum_column, Database};
use crate::budget;
use crate::config::BudgetSettings;
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetPeriod, BudgetWithProgress, NewBudget};

const SELECT_COLUMNS: &str = "id, user_id, category, amount, period, created_at";

fn duplicate_budget(period: BudgetPeriod, category: &str) -> Error {
    Error::Conflict(format!(
        "A {} budget for {} already exists",
        period, category
    ))
}

impl Database {
    /// Create a budget; at most one per (user, category, period)
    pub fn create_budget(&self, user_id: i64, budget: &NewBudget) -> Result<Budget> {
        let conn = self.conn()?;

        if Self::budget_exists(&conn, user_id, &budget.category, budget.period, None)? {
            return Err(duplicate_budget(budget.period, &budget.category));
        }

        conn.execute(
            "INSERT INTO budgets (user_id, category, amount, period) VALUES (?, ?, ?, ?)",
            params![
                user_id,
                budget.category,
                budget.amount,
                budget.period.as_str()
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// List a user's budgets by category then period
    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM budgets WHERE user_id = ? ORDER BY category, period",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let budgets = stmt
            .query_map(params![user_id], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Get a single budget owned by the user
    pub fn get_budget(&self, user_id: i64, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM budgets WHERE id = ? AND user_id = ?",
            SELECT_COLUMNS
        );
        let budget = conn
            .query_row(&sql, params![id, user_id], Self::row_to_budget)
            .optional()?;
        Ok(budget)
    }

    /// Change a budget's limit and period
    pub fn update_budget(
        &self,
        user_id: i64,
        id: i64,
        amount: f64,
        period: BudgetPeriod,
    ) -> Result<Budget> {
        let existing = self
            .get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))?;

        let conn = self.conn()?;
        if Self::budget_exists(&conn, user_id, &existing.category, period, Some(id))? {
            return Err(duplicate_budget(period, &existing.category));
        }

        conn.execute(
            "UPDATE budgets SET amount = ?, period = ? WHERE id = ? AND user_id = ?",
            params![amount, period.as_str(), id, user_id],
        )?;
        drop(conn);

        self.get_budget(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Delete a budget owned by the user
    pub fn delete_budget(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("budget {}", id)));
        }
        Ok(())
    }

    /// Evaluate a stored budget as of `today`
    pub fn budget_with_progress(
        &self,
        budget: Budget,
        today: NaiveDate,
        settings: &BudgetSettings,
    ) -> Result<BudgetWithProgress> {
        let progress = budget::evaluate(
            self,
            budget.user_id,
            &budget.category,
            budget.period,
            budget.amount,
            today,
            settings,
        )?;
        Ok(BudgetWithProgress { budget, progress })
    }

    /// Every budget of a user with its progress as of `today`
    pub fn list_budgets_with_progress(
        &self,
        user_id: i64,
        today: NaiveDate,
        settings: &BudgetSettings,
    ) -> Result<Vec<BudgetWithProgress>> {
        self.list_budgets(user_id)?
            .into_iter()
            .map(|b| self.budget_with_progress(b, today, settings))
            .collect()
    }

    fn budget_exists(
        conn: &rusqlite::Connection,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let exists: bool = conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM budgets
                WHERE user_id = ? AND category = ? AND period = ? AND id != COALESCE(?, -1)
            )
            "#,
            params![user_id, category, period.as_str(), exclude_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        let period: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category: row.get(2)?,
            amount: row.get(3)?,
            period: parse_enum_column(4, &period)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
