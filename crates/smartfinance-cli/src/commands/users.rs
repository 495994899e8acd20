//! User management commands

use anyhow::{Context, Result};
use smartfinance_core::Database;

/// Environment variable consulted when `--password` is absent
pub const PASSWORD_ENV: &str = "SMARTFINANCE_PASSWORD";

/// Prefer the explicit argument, else the environment
pub fn resolve_password(arg: Option<String>) -> Result<String> {
    arg.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .with_context(|| format!("No password given: pass --password or set {}", PASSWORD_ENV))
}

pub fn cmd_users_add(db: &Database, username: &str, email: &str, password: &str) -> Result<()> {
    let user = db
        .create_user(username.trim(), email.trim(), password)
        .context("Failed to create user")?;
    println!("✅ Created user '{}' (id {})", user.username, user.id);
    Ok(())
}
