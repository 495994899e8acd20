//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Shared by the report listing and the aggregated ledger reads so both
//! apply identical owner scoping and date bounds.

use chrono::NaiveDate;

use crate::models::TransactionType;

/// Builder for a user-scoped WHERE clause over `transactions`
#[derive(Debug, Clone)]
pub struct TransactionFilter<'query> {
    pub user_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<&'query str>,
    pub transaction_type: Option<TransactionType>,
}

/// Result of building a filter
pub struct FilterResult {
    /// WHERE clause including the "WHERE" keyword (never empty: user scope is mandatory)
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl FilterResult {
    pub fn param_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

impl<'query> TransactionFilter<'query> {
    /// Create a filter for one user's rows
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            start_date: None,
            end_date: None,
            category: None,
            transaction_type: None,
        }
    }

    /// Inclusive date range
    pub fn date_range(mut self, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        if let Some((start, end)) = range {
            self.start_date = Some(start);
            self.end_date = Some(end);
        }
        self
    }

    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    pub fn category(mut self, category: Option<&'query str>) -> Self {
        self.category = category;
        self
    }

    pub fn transaction_type(mut self, transaction_type: Option<TransactionType>) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Build the filter components
    pub fn build(&self) -> FilterResult {
        let mut conditions = vec!["t.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.user_id)];

        if let Some(start) = self.start_date {
            conditions.push("t.date >= ?".to_string());
            params.push(Box::new(start.to_string()));
        }

        if let Some(end) = self.end_date {
            conditions.push("t.date <= ?".to_string());
            params.push(Box::new(end.to_string()));
        }

        if let Some(category) = self.category {
            conditions.push("t.category = ?".to_string());
            params.push(Box::new(category.to_string()));
        }

        if let Some(tx_type) = self.transaction_type {
            conditions.push("t.transaction_type = ?".to_string());
            params.push(Box::new(tx_type.as_str()));
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}
