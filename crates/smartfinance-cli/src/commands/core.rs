//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_settings` - Settings file with built-in defaults
//! - `find_user` - Resolve a `--user` argument
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use smartfinance_core::{models::User, Database, Settings};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    Settings::load(path).context("Failed to load settings")
}

/// The date used for every "as of today" computation
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Look up the user named by `--user`
pub fn find_user(db: &Database, username: &str) -> Result<User> {
    db.get_user_by_username(username)?
        .with_context(|| format!("No such user: {}", username))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a user: smartfinance users add <username> <email>");
    println!("  2. Start web UI: smartfinance serve");

    Ok(())
}
