//! Insight command

use anyhow::Result;
use chrono::NaiveDate;
use smartfinance_core::{insight_report, AIClient, Database, Settings, Severity};

use super::find_user;

pub async fn cmd_insights(
    db: &Database,
    username: &str,
    today: NaiveDate,
    settings: &Settings,
) -> Result<()> {
    let user = find_user(db, username)?;
    let ai = AIClient::from_env_with_settings(&settings.ai);
    if ai.is_none() {
        println!("   💡 Tip: Set OLLAMA_HOST for an AI-written summary");
    }

    let report = insight_report(db, user.id, today, settings, ai.as_ref()).await?;

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────────────────────────");
    for insight in &report.insights {
        let icon = match insight.severity {
            Severity::Success => "✅",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        println!("   {} {}", icon, insight.message);
    }
    println!();
    println!("🤖 Summary");
    println!("   {}", report.summary);
    Ok(())
}
