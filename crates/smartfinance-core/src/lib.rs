//! SmartFinance Core Library
//!
//! Shared functionality for the SmartFinance personal finance tracker:
//! - Database access and migrations (SQLite, optional SQLCipher encryption)
//! - Recurring transaction projection and catch-up generation
//! - Budget progress evaluation
//! - Rule-based insight engine with an optional AI-written summary
//! - Bank statement text import with keyword categorization
//! - Filtered reports with CSV / JSON export

pub mod ai;
pub mod auth;
pub mod budget;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod schedule;
pub mod validate;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend};
pub use config::{AiSettings, BudgetSettings, InsightSettings, Settings};
pub use dashboard::{dashboard, insight_report, Dashboard, InsightReport, MonthlyPoint};
pub use db::{Database, TransactionFilter};
pub use error::{Error, Result};
pub use export::{ExportFormat, Report, ReportFilter};
pub use import::{parse_statement_text, StatementLine, StatementParser};
pub use insights::{Insight, InsightKind, Severity, AI_UNAVAILABLE_MESSAGE};
pub use ledger::LedgerReader;
