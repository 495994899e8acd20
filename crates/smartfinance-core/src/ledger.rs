//! Aggregated read access to a user's transaction history
//!
//! The insight engine and budget evaluator only ever see plain aggregated
//! records through [`LedgerReader`], never a storage API. `Database`
//! implements it with SQL; a slice of transactions implements it in memory.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::error::Result;
use crate::models::{CategoryTotal, DateRange, MonthTotal, Transaction, TransactionType};

/// Read-only aggregate queries, always scoped to one user
pub trait LedgerReader {
    /// Sum of all amounts of one type, optionally within an inclusive date range
    fn total_by_type(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<f64>;

    /// Per-category sums, largest first (ties broken by category name)
    fn sum_by_category(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<Vec<CategoryTotal>>;

    /// Sum for a single category within an inclusive date range
    fn sum_category(
        &self,
        user_id: i64,
        category: &str,
        transaction_type: TransactionType,
        range: DateRange,
    ) -> Result<f64>;

    /// Number of transactions of any type
    fn count_transactions(&self, user_id: i64) -> Result<i64>;

    /// Sums grouped by calendar month-of-year across all years, ascending by month
    fn sum_by_month_of_year(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
    ) -> Result<Vec<MonthTotal>>;
}

/// Order category totals the way every `LedgerReader` must
pub(crate) fn sort_category_totals(totals: &mut [CategoryTotal]) {
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
}

fn in_range(tx: &Transaction, range: Option<DateRange>) -> bool {
    match range {
        Some((start, end)) => tx.date >= start && tx.date <= end,
        None => true,
    }
}

impl LedgerReader for [Transaction] {
    fn total_by_type(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<f64> {
        Ok(self
            .iter()
            .filter(|t| t.user_id == user_id && t.transaction_type == transaction_type)
            .filter(|t| in_range(t, range))
            .fold(0.0, |acc, t| acc + t.amount))
    }

    fn sum_by_category(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        range: Option<DateRange>,
    ) -> Result<Vec<CategoryTotal>> {
        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for tx in self
            .iter()
            .filter(|t| t.user_id == user_id && t.transaction_type == transaction_type)
            .filter(|t| in_range(t, range))
        {
            *by_category.entry(tx.category.as_str()).or_default() += tx.amount;
        }

        let mut totals: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
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
        Ok(self
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && t.transaction_type == transaction_type
                    && t.category == category
            })
            .filter(|t| in_range(t, Some(range)))
            .fold(0.0, |acc, t| acc + t.amount))
    }

    fn count_transactions(&self, user_id: i64) -> Result<i64> {
        Ok(self.iter().filter(|t| t.user_id == user_id).count() as i64)
    }

    fn sum_by_month_of_year(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
    ) -> Result<Vec<MonthTotal>> {
        let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();
        for tx in self
            .iter()
            .filter(|t| t.user_id == user_id && t.transaction_type == transaction_type)
        {
            *by_month.entry(tx.date.month()).or_default() += tx.amount;
        }
        Ok(by_month
            .into_iter()
            .map(|(month, total)| MonthTotal { month, total })
            .collect())
    }
}
