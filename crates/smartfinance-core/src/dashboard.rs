//! Dashboard and insight bundles
//!
//! These gather everything one screen needs in a single call. The AI summary
//! is requested last, after every rule-based number has been computed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ai::AIClient;
use crate::config::Settings;
use crate::db::Database;
use crate::error::Result;
use crate::insights::{build_summary_prompt, compute_insights, generate_summary, Insight};
use crate::ledger::LedgerReader;
use crate::models::{CategoryTotal, Transaction, TransactionType};

/// How many recent transactions the dashboard lists
pub const RECENT_TRANSACTIONS: i64 = 10;

/// Expense total for one month of the year, across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Chart label, "Month N"
    pub label: String,
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub recent_transactions: Vec<Transaction>,
    pub expense_by_category: Vec<CategoryTotal>,
    pub expense_by_month: Vec<MonthlyPoint>,
    pub insights: Vec<Insight>,
    /// Present only when an AI backend is configured
    pub ai_summary: Option<String>,
}

/// Rule-based insights plus the AI summary (or its fallback message)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub insights: Vec<Insight>,
    pub summary: String,
}

/// Assemble the dashboard for a user as of `today`
pub async fn dashboard(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
    settings: &Settings,
    ai: Option<&AIClient>,
) -> Result<Dashboard> {
    let total_income = db.total_by_type(user_id, TransactionType::Income, None)?;
    let total_expense = db.total_by_type(user_id, TransactionType::Expense, None)?;
    let recent_transactions = db.list_transactions(user_id, Some(RECENT_TRANSACTIONS))?;
    let expense_by_category = db.sum_by_category(user_id, TransactionType::Expense, None)?;
    let expense_by_month = db
        .sum_by_month_of_year(user_id, TransactionType::Expense)?
        .into_iter()
        .map(|m| MonthlyPoint {
            label: format!("Month {}", m.month),
            month: m.month,
            total: m.total,
        })
        .collect();
    let insights = compute_insights(db, user_id, today, &settings.insights)?;

    let ai_summary = match ai {
        Some(client) => {
            let prompt =
                build_summary_prompt(total_income, total_expense, &expense_by_category, &insights);
            Some(generate_summary(Some(client), &prompt).await)
        }
        None => None,
    };

    Ok(Dashboard {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        recent_transactions,
        expense_by_category,
        expense_by_month,
        insights,
        ai_summary,
    })
}

/// Compute insights and append the AI summary
pub async fn insight_report(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
    settings: &Settings,
    ai: Option<&AIClient>,
) -> Result<InsightReport> {
    let income = db.total_by_type(user_id, TransactionType::Income, None)?;
    let expense = db.total_by_type(user_id, TransactionType::Expense, None)?;
    let categories = db.sum_by_category(user_id, TransactionType::Expense, None)?;
    let insights = compute_insights(db, user_id, today, &settings.insights)?;

    let prompt = build_summary_prompt(income, expense, &categories, &insights);
    let summary = generate_summary(ai, &prompt).await;

    Ok(InsightReport { insights, summary })
}
