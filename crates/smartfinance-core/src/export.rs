//! Filtered transaction reports and their CSV / JSON export
//!
//! A report is a user's transactions matching a [`ReportFilter`], newest
//! first, with income/expense totals computed over exactly those rows.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{Database, TransactionFilter};
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};
use crate::validate::{parse_date, parse_transaction_type};

/// File name offered for CSV downloads
pub const CSV_FILE_NAME: &str = "transactions_report.csv";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Report filter; every field is optional and dates are inclusive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub transaction_type: Option<TransactionType>,
}

/// Treat blank values and the literal `all` as "no filter"
fn selected(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ReportFilter {
    /// Build a filter from raw query values
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<&str>,
        transaction_type: Option<&str>,
    ) -> Result<Self> {
        let start_date = selected(start_date).map(parse_date).transpose()?;
        let end_date = selected(end_date).map(parse_date).transpose()?;
        let transaction_type = selected(transaction_type)
            .map(parse_transaction_type)
            .transpose()?;

        Ok(Self {
            start_date,
            end_date,
            category: selected(category).map(str::to_string),
            transaction_type,
        })
    }
}

/// Rows matching a filter plus their totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub filter: ReportFilter,
    pub transactions: Vec<Transaction>,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    /// Every category the user has used, for filter pickers
    pub categories: Vec<String>,
}

impl Report {
    /// Assemble a report, computing totals over `transactions`
    pub fn new(filter: ReportFilter, transactions: Vec<Transaction>, categories: Vec<String>) -> Self {
        let total_of = |kind: TransactionType| -> f64 {
            transactions
                .iter()
                .filter(|t| t.transaction_type == kind)
                .fold(0.0, |acc, t| acc + t.amount)
        };
        let total_income = total_of(TransactionType::Income);
        let total_expense = total_of(TransactionType::Expense);

        Self {
            filter,
            transactions,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            categories,
        }
    }

    /// Render as CSV: one row per transaction, a blank line, then a summary block
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv_writer(Vec::new());

        writer.write_record(["Date", "Category", "Description", "Type", "Amount"])?;
        for tx in &self.transactions {
            writer.write_record([
                tx.date.format("%Y-%m-%d").to_string(),
                tx.category.clone(),
                tx.description.clone().unwrap_or_default(),
                tx.transaction_type.label().to_string(),
                format!("{:.2}", tx.amount),
            ])?;
        }

        // An empty record would be written as `""`
        let mut bytes = finish(writer)?;
        bytes.extend_from_slice(b"\r\n");

        let mut writer = csv_writer(bytes);
        writer.write_record(["Summary"])?;
        writer.write_record(["Total Income".to_string(), format!("{:.2}", self.total_income)])?;
        writer.write_record(["Total Expenses".to_string(), format!("{:.2}", self.total_expense)])?;
        writer.write_record(["Balance".to_string(), format!("{:.2}", self.balance)])?;

        String::from_utf8(finish(writer)?)
            .map_err(|e| Error::Validation(format!("Report is not UTF-8: {}", e)))
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render in the requested format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Json => self.to_json(),
        }
    }
}

fn csv_writer(buffer: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(buffer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

impl Database {
    /// Build a report over one user's transactions
    pub fn report(&self, user_id: i64, filter: &ReportFilter) -> Result<Report> {
        let query = TransactionFilter::for_user(user_id)
            .start_date(filter.start_date)
            .end_date(filter.end_date)
            .category(filter.category.as_deref())
            .transaction_type(filter.transaction_type);

        let transactions = self.query_transactions(&query)?;
        let categories = self.list_categories(user_id)?;
        debug!(user_id, rows = transactions.len(), "Built report");

        Ok(Report::new(filter.clone(), transactions, categories))
    }
}
