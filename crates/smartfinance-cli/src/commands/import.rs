//! Statement import command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use smartfinance_core::{parse_statement_text, Database};

use super::{find_user, truncate};

/// Parse a statement text file; store the lines when `commit` is set.
///
/// Returns the number of transactions stored.
pub fn cmd_import(
    db: &Database,
    username: &str,
    file: &Path,
    commit: bool,
    today: NaiveDate,
) -> Result<usize> {
    let user = find_user(db, username)?;
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read statement: {}", file.display()))?;

    println!("📥 Parsing {}...", file.display());
    let lines = parse_statement_text(&text, today)?;
    println!("   Found {} transactions", lines.len());

    for line in &lines {
        println!(
            "   {} {:<40} {:<20} {:<8} {:>10.2}",
            line.date,
            truncate(&line.description, 40),
            truncate(&line.category, 20),
            line.transaction_type.as_str(),
            line.amount
        );
    }

    if !commit {
        println!();
        println!("   Preview only. Re-run with --commit to save these transactions.");
        return Ok(0);
    }

    let stored = db.import_statement_lines(user.id, &lines)?;
    println!("✅ Imported {} transactions", stored.len());
    Ok(stored.len())
}
