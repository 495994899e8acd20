//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use smartfinance_core::Settings;
use smartfinance_server::{ServerConfig, ALLOWED_ORIGINS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    settings: Settings,
) -> Result<()> {
    println!("🚀 Starting SmartFinance web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env();
    if config.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!(
            "   🌐 CORS origins: {} ({})",
            config.allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }
    println!();

    let db = open_db(db_path, no_encrypt)?;
    let static_dir = static_dir
        .map(|d| d.to_str().context("Static directory path is not valid UTF-8"))
        .transpose()?;

    smartfinance_server::serve_with_config(db, host, port, static_dir, config, settings).await
}
