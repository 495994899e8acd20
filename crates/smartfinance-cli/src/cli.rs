//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SmartFinance - Track income, expenses, budgets and recurring bills
#[derive(Parser)]
#[command(name = "smartfinance")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "smartfinance.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SMARTFINANCE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Settings file (TOML); defaults to the per-user data directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage recurring transactions
    Recurring {
        #[command(subcommand)]
        action: RecurringAction,
    },

    /// Show rule-based insights and the AI summary
    Insights {
        /// Username
        #[arg(short, long)]
        user: String,
    },

    /// Show budgets with their progress for the current period
    Budgets {
        /// Username
        #[arg(short, long)]
        user: String,
    },

    /// Filtered transaction report with totals
    Report {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Category name, or "all"
        #[arg(long)]
        category: Option<String>,

        /// income, expense, or all
        #[arg(long = "type")]
        transaction_type: Option<String>,

        /// Output format: csv, json
        #[arg(long, default_value = "csv")]
        format: String,

        /// Write the export to this file instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse bank statement text into transactions
    Import {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Plain-text statement file
        #[arg(short, long)]
        file: PathBuf,

        /// Store the parsed transactions (default: preview only)
        #[arg(long)]
        commit: bool,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Create a user
    ///
    /// The password is read from SMARTFINANCE_PASSWORD when --password is not given.
    Add {
        username: String,
        email: String,

        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List rules with their next occurrence
    List {
        /// Username
        #[arg(short, long)]
        user: String,
    },

    /// Generate every occurrence due up to today
    RunDue {
        /// Username
        #[arg(short, long)]
        user: String,
    },
}
