//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, find_user)
//! - `budgets` - Budget progress listing
//! - `import` - Bank statement text import
//! - `insights` - Rule-based insights and AI summary
//! - `recurring` - Recurring rule listing and catch-up
//! - `reports` - Filtered report and CSV/JSON export
//! - `serve` - Web server command
//! - `users` - User management

pub mod budgets;
pub mod core;
pub mod import;
pub mod insights;
pub mod recurring;
pub mod reports;
pub mod serve;
pub mod users;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use import::*;
pub use insights::*;
pub use recurring::*;
pub use reports::*;
pub use serve::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
