//! Input validation
//!
//! Raw request payloads are checked here, before any core computation runs.
//! Every rejection is an [`Error::Validation`] with a message fit for the user.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{
    BudgetPeriod, Frequency, NewBudget, NewRecurringTransaction, NewTransaction, RecurringUpdate,
    TransactionType,
};

/// An amount as submitted: either a JSON number or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// Parse and require a strictly positive amount
    pub fn parse(&self) -> Result<f64> {
        let value = match self {
            RawAmount::Number(n) => *n,
            RawAmount::Text(s) => parse_amount_str(s)?,
        };
        check_positive(value)
    }
}

impl From<f64> for RawAmount {
    fn from(n: f64) -> Self {
        RawAmount::Number(n)
    }
}

fn parse_amount_str(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| Error::Validation("Invalid amount format.".to_string()))
}

fn check_positive(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::Validation("Invalid amount format.".to_string()));
    }
    if value <= 0.0 {
        return Err(Error::Validation(
            "Amount must be greater than zero.".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

pub fn parse_transaction_type(s: &str) -> Result<TransactionType> {
    s.parse()
        .map_err(|_| Error::Validation("Type must be 'income' or 'expense'.".to_string()))
}

fn parse_frequency(s: &str) -> Result<Frequency> {
    s.parse().map_err(|_| {
        Error::Validation(
            "Frequency must be one of daily, weekly, biweekly, monthly, yearly.".to_string(),
        )
    })
}

fn parse_period(s: &str) -> Result<BudgetPeriod> {
    s.parse().map_err(|_| {
        Error::Validation("Period must be one of monthly, weekly, yearly.".to_string())
    })
}

/// Require a non-blank field, returning it trimmed
pub fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required.", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reject an end date that precedes the start date
pub fn check_date_order(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(Error::Validation(
            "End date must be after start date.".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Transaction payload before validation
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    #[serde(alias = "type")]
    pub transaction_type: String,
    pub category: String,
    pub amount: RawAmount,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
}

impl TransactionInput {
    pub fn validate(self) -> Result<NewTransaction> {
        Ok(NewTransaction {
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            category: required("Category", &self.category)?,
            amount: self.amount.parse()?,
            description: optional_text(self.description),
            date: parse_date(&self.date)?,
        })
    }
}

/// Budget payload before validation
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetInput {
    pub category: String,
    pub amount: RawAmount,
    #[serde(default)]
    pub period: Option<String>,
}

fn period_or_default(period: Option<&str>) -> Result<BudgetPeriod> {
    match period.map(str::trim) {
        None | Some("") => Ok(BudgetPeriod::default()),
        Some(p) => parse_period(p),
    }
}

impl BudgetInput {
    pub fn validate(self) -> Result<NewBudget> {
        Ok(NewBudget {
            category: required("Category", &self.category)?,
            amount: self.amount.parse()?,
            period: period_or_default(self.period.as_deref())?,
        })
    }
}

/// Budget edit payload; the category of a budget never changes
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetUpdateInput {
    pub amount: RawAmount,
    #[serde(default)]
    pub period: Option<String>,
}

impl BudgetUpdateInput {
    pub fn validate(self) -> Result<(f64, BudgetPeriod)> {
        Ok((
            self.amount.parse()?,
            period_or_default(self.period.as_deref())?,
        ))
    }
}

/// Recurring rule payload before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RecurringInput {
    #[serde(alias = "type")]
    pub transaction_type: String,
    pub category: String,
    pub amount: RawAmount,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RecurringInput {
    pub fn validate(self) -> Result<NewRecurringTransaction> {
        let start_date = parse_date(&self.start_date)?;
        let end_date = parse_optional_date(self.end_date.as_deref())?;
        check_date_order(start_date, end_date)?;

        Ok(NewRecurringTransaction {
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            category: required("Category", &self.category)?,
            amount: self.amount.parse()?,
            description: optional_text(self.description),
            frequency: parse_frequency(&self.frequency)?,
            start_date,
            end_date,
        })
    }
}

/// Recurring rule edit payload before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RecurringUpdateInput {
    pub amount: RawAmount,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RecurringUpdateInput {
    /// Validate against the rule's stored start date
    pub fn validate(self, start_date: NaiveDate) -> Result<RecurringUpdate> {
        let end_date = parse_optional_date(self.end_date.as_deref())?;
        check_date_order(start_date, end_date)?;

        Ok(RecurringUpdate {
            amount: self.amount.parse()?,
            description: optional_text(self.description),
            frequency: parse_frequency(&self.frequency)?,
            end_date,
            is_active: self.is_active,
        })
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}
