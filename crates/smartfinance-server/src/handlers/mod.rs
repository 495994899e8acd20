//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod import;
pub mod insights;
pub mod recurring;
pub mod reports;
pub mod transactions;

// Re-export all handlers for use in router
pub use auth::*;
pub use budgets::*;
pub use dashboard::*;
pub use import::*;
pub use insights::*;
pub use recurring::*;
pub use reports::*;
pub use transactions::*;
