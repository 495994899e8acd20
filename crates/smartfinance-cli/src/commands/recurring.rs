//! Recurring transaction commands

use anyhow::Result;
use chrono::NaiveDate;
use smartfinance_core::Database;

use super::{find_user, truncate};

pub fn cmd_recurring_list(db: &Database, username: &str) -> Result<()> {
    let user = find_user(db, username)?;
    let rules = db.list_recurring_with_next(user.id)?;

    if rules.is_empty() {
        println!("No recurring transactions.");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Transactions");
    println!("   ─────────────────────────────────────────────────────────────");
    for entry in &rules {
        let rule = &entry.recurring;
        let next = entry
            .next_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   #{:<4} {:<8} {:<20} {:>10.2}  {:<8} next: {}{}",
            rule.id,
            rule.transaction_type.as_str(),
            truncate(&rule.category, 20),
            rule.amount,
            rule.frequency.as_str(),
            next,
            if rule.is_active { "" } else { "  (inactive)" }
        );
    }
    Ok(())
}

/// Materialize every occurrence due on or before `today`; returns how many were created
pub fn cmd_recurring_run_due(db: &Database, username: &str, today: NaiveDate) -> Result<usize> {
    let user = find_user(db, username)?;
    let generated = db.generate_due(user.id, today)?;

    if generated.is_empty() {
        println!("✅ Nothing due.");
    } else {
        for tx in &generated {
            println!(
                "   + {} {:<20} {:>10.2}",
                tx.date,
                truncate(&tx.category, 20),
                tx.amount
            );
        }
        println!("✅ Generated {} transactions", generated.len());
    }
    Ok(generated.len())
}
