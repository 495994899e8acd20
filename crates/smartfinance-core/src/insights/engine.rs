//! Rule-based insight computation
//!
//! Rules run in a fixed order which is the display order. Every rule reads
//! through [`LedgerReader`] scoped to one user, so the engine never sees
//! another user's rows.

use chrono::{Datelike, Duration, Month, NaiveDate};
use serde_json::json;
use tracing::debug;

use super::types::{Insight, InsightKind, Severity};
use crate::config::InsightSettings;
use crate::error::Result;
use crate::ledger::LedgerReader;
use crate::models::{CategoryTotal, MonthTotal, TransactionType};

/// Compute the ordered insight list for a user as of `today`
pub fn compute_insights<R: LedgerReader + ?Sized>(
    reader: &R,
    user_id: i64,
    today: NaiveDate,
    settings: &InsightSettings,
) -> Result<Vec<Insight>> {
    let income = reader.total_by_type(user_id, TransactionType::Income, None)?;
    let expense = reader.total_by_type(user_id, TransactionType::Expense, None)?;
    let categories = reader.sum_by_category(user_id, TransactionType::Expense, None)?;
    let count = reader.count_transactions(user_id)?;

    let mut insights = Vec::new();

    insights.extend(income_vs_expense(income, expense));
    insights.extend(top_category(&categories));
    insights.extend(getting_started(count, settings));
    insights.extend(expense_ratio(income, expense, settings));

    let monthly = monthly_expense_trend(reader, user_id, today, settings.trend_months)?;
    insights.extend(spending_trend(&monthly, settings));

    insights.extend(savings_recommendation(income, expense));

    let months = reader.sum_by_month_of_year(user_id, TransactionType::Expense)?;
    insights.extend(seasonal(&months));

    insights.extend(concentration(&categories, expense, settings));

    if insights.is_empty() {
        insights.push(start_tracking(count));
    }

    debug!(user_id, count = insights.len(), "Computed insights");
    Ok(insights)
}

/// Savings rate as a percentage of income; 0 when there is no income
pub fn savings_rate(income: f64, expense: f64) -> f64 {
    if income > 0.0 {
        (income - expense) / income * 100.0
    } else {
        0.0
    }
}

fn income_vs_expense(income: f64, expense: f64) -> Option<Insight> {
    if expense > income {
        Some(
            Insight::new(
                InsightKind::IncomeVsExpense,
                Severity::Warning,
                "High spending alert! Your expenses exceed your income.",
            )
            .with_data(json!({ "income": income, "expense": expense })),
        )
    } else if income > expense {
        let savings = income - expense;
        let rate = savings_rate(income, expense);
        Some(
            Insight::new(
                InsightKind::IncomeVsExpense,
                Severity::Success,
                format!(
                    "Great job! You're saving ${:.2} ({:.1}% of income).",
                    savings, rate
                ),
            )
            .with_data(json!({ "income": income, "expense": expense, "savings": savings, "savings_rate": rate })),
        )
    } else {
        None
    }
}

fn top_category(categories: &[CategoryTotal]) -> Option<Insight> {
    let top = categories.first()?;
    Some(
        Insight::new(
            InsightKind::TopCategory,
            Severity::Info,
            format!(
                "Your top spending category is \"{}\" with ${:.2}.",
                top.category, top.total
            ),
        )
        .with_data(json!({ "category": top.category, "total": top.total })),
    )
}

fn getting_started(count: i64, settings: &InsightSettings) -> Option<Insight> {
    if count == 0 || count >= settings.beginner_transaction_count {
        return None;
    }
    Some(
        Insight::new(
            InsightKind::GettingStarted,
            Severity::Info,
            "Add more transactions to get better financial insights.",
        )
        .with_data(json!({ "transaction_count": count })),
    )
}

fn expense_ratio(income: f64, expense: f64, settings: &InsightSettings) -> Option<Insight> {
    if income <= 0.0 || expense <= 0.0 {
        return None;
    }

    let ratio = expense / income * 100.0;
    let data = json!({ "expense_ratio": ratio });

    if ratio < settings.low_expense_ratio {
        Some(
            Insight::new(
                InsightKind::ExpenseRatio,
                Severity::Success,
                format!(
                    "Excellent! You're only spending {:.1}% of your income.",
                    ratio
                ),
            )
            .with_data(data),
        )
    } else if ratio > settings.high_expense_ratio {
        Some(
            Insight::new(
                InsightKind::ExpenseRatio,
                Severity::Warning,
                format!(
                    "You're spending {:.1}% of your income. Consider reducing expenses.",
                    ratio
                ),
            )
            .with_data(data),
        )
    } else {
        None
    }
}

/// Expense totals for the previous `months` months, oldest first
///
/// "Months ago" is approximated as `30 * i` days before `today`, then widened
/// to that date's whole calendar month. Near month boundaries two offsets can
/// land in the same calendar month.
pub fn monthly_expense_trend<R: LedgerReader + ?Sized>(
    reader: &R,
    user_id: i64,
    today: NaiveDate,
    months: u32,
) -> Result<Vec<f64>> {
    let mut totals = Vec::with_capacity(months as usize);
    for i in (1..=months as i64).rev() {
        let month_ago = today - Duration::days(30 * i);
        let window = calendar_month(month_ago);
        totals.push(reader.total_by_type(user_id, TransactionType::Expense, Some(window))?);
    }
    Ok(totals)
}

fn calendar_month(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let end = next.and_then(|n| n.pred_opt()).unwrap_or(date);
    (start, end)
}

/// Compare the latest monthly total with the one before it
pub fn spending_trend(monthly: &[f64], settings: &InsightSettings) -> Option<Insight> {
    let [.., previous, latest] = monthly else {
        return None;
    };
    let delta = latest - previous;
    if delta.abs() <= settings.trend_threshold {
        return None;
    }

    let data = json!({ "previous": previous, "latest": latest, "delta": delta });
    let insight = if delta > 0.0 {
        Insight::new(
            InsightKind::SpendingTrend,
            Severity::Warning,
            format!(
                "Spending trend: Your expenses increased by ${:.2} compared to last month.",
                delta.abs()
            ),
        )
    } else {
        Insight::new(
            InsightKind::SpendingTrend,
            Severity::Success,
            format!(
                "Spending trend: Great! You reduced expenses by ${:.2} compared to last month.",
                delta.abs()
            ),
        )
    };
    Some(insight.with_data(data))
}

/// Tiered savings advice; skipped when there is no income
pub fn savings_recommendation(income: f64, expense: f64) -> Option<Insight> {
    if income <= 0.0 {
        return None;
    }

    let rate = savings_rate(income, expense);
    let tip = if rate < 10.0 {
        "Aim to save at least 10% of your income. Start by identifying one category to reduce spending."
            .to_string()
    } else if rate < 20.0 {
        format!(
            "You're saving {:.1}% - good start! Try to reach 20% by cutting discretionary expenses.",
            rate
        )
    } else if rate < 30.0 {
        format!(
            "Great savings rate of {:.1}%! Consider increasing to 30% for long-term financial security.",
            rate
        )
    } else {
        format!(
            "Excellent {:.1}% savings rate! You're building strong financial habits.",
            rate
        )
    };

    Some(
        Insight::new(
            InsightKind::SavingsTip,
            Severity::Info,
            format!("Savings tip: {}", tip),
        )
        .with_data(json!({ "savings_rate": rate })),
    )
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// Highest and lowest spending months of the year, across all years
fn seasonal(months: &[MonthTotal]) -> Option<Insight> {
    if months.len() < 2 {
        return None;
    }

    // First wins on ties, scanning January to December
    let mut highest = &months[0];
    let mut lowest = &months[0];
    for m in &months[1..] {
        if m.total > highest.total {
            highest = m;
        }
        if m.total < lowest.total {
            lowest = m;
        }
    }

    if highest.month == lowest.month {
        return None;
    }

    Some(
        Insight::new(
            InsightKind::Seasonal,
            Severity::Info,
            format!(
                "Seasonal insight: Your highest spending was in {} (${:.2}), lowest in {} (${:.2}).",
                month_name(highest.month),
                highest.total,
                month_name(lowest.month),
                lowest.total
            ),
        )
        .with_data(json!({
            "highest_month": highest.month,
            "highest_amount": highest.total,
            "lowest_month": lowest.month,
            "lowest_amount": lowest.total,
        })),
    )
}

fn concentration(
    categories: &[CategoryTotal],
    total_expense: f64,
    settings: &InsightSettings,
) -> Option<Insight> {
    let [first, second, ..] = categories else {
        return None;
    };
    if total_expense <= 0.0 {
        return None;
    }

    let percentage = (first.total + second.total) / total_expense * 100.0;
    if percentage <= settings.concentration_percent {
        return None;
    }

    Some(
        Insight::new(
            InsightKind::Concentration,
            Severity::Info,
            format!(
                "{:.0}% of your spending is on {} and {}. Consider diversifying or optimizing these categories.",
                percentage, first.category, second.category
            ),
        )
        .with_data(json!({
            "percentage": percentage,
            "categories": [first.category, second.category],
        })),
    )
}

fn start_tracking(count: i64) -> Insight {
    let message = if count == 0 {
        "Start tracking your finances by adding your first transaction!"
    } else {
        "Keep tracking your transactions for personalized insights!"
    };
    Insight::new(InsightKind::StartTracking, Severity::Info, message)
        .with_data(json!({ "transaction_count": count }))
}
