//! Core types for the insight engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rule produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Income compared with expense
    IncomeVsExpense,
    /// Largest expense category
    TopCategory,
    /// Guidance for users with only a few transactions
    GettingStarted,
    /// Expense as a share of income
    ExpenseRatio,
    /// Month-over-month expense change
    SpendingTrend,
    /// Tiered savings-rate recommendation
    SavingsTip,
    /// Highest and lowest spending months of the year
    Seasonal,
    /// Spending concentrated in the top two categories
    Concentration,
    /// Fallback when nothing else applies
    StartTracking,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::IncomeVsExpense => "income_vs_expense",
            InsightKind::TopCategory => "top_category",
            InsightKind::GettingStarted => "getting_started",
            InsightKind::ExpenseRatio => "expense_ratio",
            InsightKind::SpendingTrend => "spending_trend",
            InsightKind::SavingsTip => "savings_tip",
            InsightKind::Seasonal => "seasonal",
            InsightKind::Concentration => "concentration",
            InsightKind::StartTracking => "start_tracking",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income_vs_expense" => Ok(InsightKind::IncomeVsExpense),
            "top_category" => Ok(InsightKind::TopCategory),
            "getting_started" => Ok(InsightKind::GettingStarted),
            "expense_ratio" => Ok(InsightKind::ExpenseRatio),
            "spending_trend" => Ok(InsightKind::SpendingTrend),
            "savings_tip" => Ok(InsightKind::SavingsTip),
            "seasonal" => Ok(InsightKind::Seasonal),
            "concentration" => Ok(InsightKind::Concentration),
            "start_tracking" => Ok(InsightKind::StartTracking),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information
    Info,
    /// Something is going well
    Success,
    /// Worth attention
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rule-derived observation about a user's finances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    /// Default English rendering of the insight
    pub message: String,
    /// Numbers the message was built from, for presentation layers that
    /// format their own text
    pub data: serde_json::Value,
}

impl Insight {
    pub fn new(kind: InsightKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            data: serde_json::Value::Null,
        }
    }

    /// Add structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
