//! SmartFinance CLI - Personal finance tracker
//!
//! Usage:
//!   smartfinance init                              Initialize database
//!   smartfinance users add NAME EMAIL              Create a user
//!   smartfinance recurring run-due --user NAME     Catch up recurring transactions
//!   smartfinance report --user NAME --output r.csv Export a report
//!   smartfinance serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
                settings,
            )
            .await
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                UsersAction::Add {
                    username,
                    email,
                    password,
                } => {
                    let password = commands::resolve_password(password)?;
                    commands::cmd_users_add(&db, &username, &email, &password)
                }
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                RecurringAction::List { user } => commands::cmd_recurring_list(&db, &user),
                RecurringAction::RunDue { user } => {
                    commands::cmd_recurring_run_due(&db, &user, commands::today()).map(|_| ())
                }
            }
        }
        Commands::Insights { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_insights(&db, &user, commands::today(), &settings).await
        }
        Commands::Budgets { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_budgets(&db, &user, commands::today(), &settings)
        }
        Commands::Report {
            user,
            from,
            to,
            category,
            transaction_type,
            format,
            output,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let filter = commands::report_filter(
                from.as_deref(),
                to.as_deref(),
                category.as_deref(),
                transaction_type.as_deref(),
            )?;
            commands::cmd_report(&db, &user, &filter, &format, output.as_deref())
        }
        Commands::Import { user, file, commit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &user, &file, commit, commands::today()).map(|_| ())
        }
    }
}
