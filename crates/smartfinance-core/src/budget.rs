//! Budget progress evaluation
//!
//! Windows are computed from the evaluation date, not per transaction:
//! a weekly budget always covers Monday through Sunday of `today`'s week.

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::BudgetSettings;
use crate::error::Result;
use crate::ledger::LedgerReader;
use crate::models::{BudgetPeriod, BudgetProgress, BudgetStatus, DateRange, TransactionType};

/// Inclusive date window a budget period covers on `today`
pub fn period_window(period: BudgetPeriod, today: NaiveDate) -> DateRange {
    match period {
        BudgetPeriod::Weekly => {
            let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (start, start + Duration::days(6))
        }
        BudgetPeriod::Monthly => {
            let start = today.with_day(1).unwrap_or(today);
            (start, last_day_of_month(today))
        }
        BudgetPeriod::Yearly => {
            let year = today.year();
            (
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today),
            )
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// Progress of `spent` against `limit`
///
/// A zero limit yields 0%; its status then depends only on whether anything
/// was spent.
pub fn progress(spent: f64, limit: f64, settings: &BudgetSettings) -> BudgetProgress {
    let percentage = if limit > 0.0 {
        spent / limit * 100.0
    } else {
        0.0
    };

    let status = if spent > limit {
        BudgetStatus::Danger
    } else if percentage > settings.warning_percent {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Success
    };

    BudgetProgress {
        spent,
        remaining: limit - spent,
        percentage,
        status,
    }
}

/// Evaluate one budget for a user as of `today`
pub fn evaluate<R: LedgerReader + ?Sized>(
    reader: &R,
    user_id: i64,
    category: &str,
    period: BudgetPeriod,
    limit: f64,
    today: NaiveDate,
    settings: &BudgetSettings,
) -> Result<BudgetProgress> {
    let window = period_window(period, today);
    let spent = reader.sum_category(user_id, category, TransactionType::Expense, window)?;
    Ok(progress(spent, limit, settings))
}
