//! Report command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use smartfinance_core::{Database, ExportFormat, ReportFilter};

use super::{find_user, truncate};

/// Build a report filter from CLI flags; blank values and "all" mean no filter
pub fn report_filter(
    from: Option<&str>,
    to: Option<&str>,
    category: Option<&str>,
    transaction_type: Option<&str>,
) -> Result<ReportFilter> {
    ReportFilter::from_params(from, to, category, transaction_type).context("Invalid report filter")
}

pub fn cmd_report(
    db: &Database,
    username: &str,
    filter: &ReportFilter,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let user = find_user(db, username)?;
    let report = db.report(user.id, filter)?;

    if let Some(path) = output {
        let body = report.export(format)?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!(
            "✅ Exported {} transactions to {} ({})",
            report.transactions.len(),
            path.display(),
            format
        );
        return Ok(());
    }

    println!();
    println!("📊 Transaction Report");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.transactions.is_empty() {
        println!("   No transactions match the filter.");
    }
    for tx in &report.transactions {
        println!(
            "   {} {:<20} {:<30} {:<8} {:>10.2}",
            tx.date,
            truncate(&tx.category, 20),
            truncate(tx.description.as_deref().unwrap_or(""), 30),
            tx.transaction_type.label(),
            tx.amount
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total Income:   {:>12.2}", report.total_income);
    println!("   Total Expenses: {:>12.2}", report.total_expense);
    println!("   Balance:        {:>12.2}", report.balance);
    Ok(())
}
