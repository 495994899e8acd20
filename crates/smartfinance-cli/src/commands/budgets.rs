//! Budget commands

use anyhow::Result;
use chrono::NaiveDate;
use smartfinance_core::{models::BudgetStatus, Database, Settings};

use super::{find_user, truncate};

pub fn cmd_budgets(
    db: &Database,
    username: &str,
    today: NaiveDate,
    settings: &Settings,
) -> Result<()> {
    let user = find_user(db, username)?;
    let budgets = db.list_budgets_with_progress(user.id, today, &settings.budgets)?;

    if budgets.is_empty() {
        println!("No budgets.");
        return Ok(());
    }

    println!();
    println!("💰 Budgets as of {}", today);
    println!("   ─────────────────────────────────────────────────────────────");
    for entry in &budgets {
        let icon = match entry.progress.status {
            BudgetStatus::Success => "🟢",
            BudgetStatus::Warning => "🟡",
            BudgetStatus::Danger => "🔴",
        };
        println!(
            "   {} {:<20} {:<8} {:>10.2} / {:>10.2}  ({:.1}%)",
            icon,
            truncate(&entry.budget.category, 20),
            entry.budget.period.as_str(),
            entry.progress.spent,
            entry.budget.amount,
            entry.progress.percentage
        );
    }
    Ok(())
}
