//! Recurring-schedule projection
//!
//! Pure date math over a [`RecurringTransaction`] rule. Nothing here touches
//! storage: callers persist the materialized transaction and advance
//! `last_generated` themselves (see `Database::generate_now`).

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Frequency, NewTransaction, RecurringTransaction};

/// Suffix appended to descriptions of generated transactions
pub const RECURRING_SUFFIX: &str = "(Recurring)";

/// Compute the next occurrence of a rule.
///
/// When `from_date` is `None` the projection starts at `last_generated`,
/// falling back to `start_date` for a rule that has never been materialized.
pub fn next_occurrence(rule: &RecurringTransaction, from_date: Option<NaiveDate>) -> NaiveDate {
    let from = from_date
        .or(rule.last_generated)
        .unwrap_or(rule.start_date);
    advance(from, rule.frequency)
}

/// Step a date forward by one period of `frequency`
pub fn advance(from: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => from + Duration::days(1),
        Frequency::Weekly => from + Duration::weeks(1),
        Frequency::Biweekly => from + Duration::weeks(2),
        Frequency::Monthly => next_month_same_day(from),
        Frequency::Yearly => next_year_same_day(from),
    }
}

/// Same day-of-month in the following month, clamped down to the last valid
/// day of that month. Never rolls over into the month after.
fn next_month_same_day(from: NaiveDate) -> NaiveDate {
    let (year, month) = if from.month() == 12 {
        (from.year() + 1, 1)
    } else {
        (from.year(), from.month() + 1)
    };

    let mut day = from.day();
    while day > 0 {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date;
        }
        day -= 1;
    }
    from
}

/// Same month/day next year; Feb 29 falls back to Feb 28 in non-leap years.
fn next_year_same_day(from: NaiveDate) -> NaiveDate {
    let year = from.year() + 1;
    NaiveDate::from_ymd_opt(year, from.month(), from.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, from.month(), 28))
        .unwrap_or(from)
}

/// Build the transaction for `target_date`, or `None` if the rule has ended
/// before that date.
pub fn materialize(rule: &RecurringTransaction, target_date: NaiveDate) -> Option<NewTransaction> {
    if let Some(end) = rule.end_date {
        if target_date > end {
            return None;
        }
    }

    Some(NewTransaction {
        transaction_type: rule.transaction_type,
        category: rule.category.clone(),
        amount: rule.amount,
        description: Some(recurring_description(rule.description.as_deref())),
        date: target_date,
    })
}

fn recurring_description(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("{} {}", d, RECURRING_SUFFIX),
        None => RECURRING_SUFFIX.to_string(),
    }
}
