//! Insight Engine - rule-based financial insights
//!
//! Given a user's transaction history, the engine derives an ordered list of
//! short observations (overspending, top category, trend, savings advice and
//! so on). An optional AI-written summary can be appended afterwards.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartfinance_core::insights::{compute_insights, generate_summary};
//!
//! let insights = compute_insights(&db, user_id, today, &settings.insights)?;
//! let summary = generate_summary(ai.as_ref(), &prompt).await;
//! ```

pub mod engine;
pub mod summary;
pub mod types;

pub use engine::{
    compute_insights, monthly_expense_trend, savings_rate, savings_recommendation, spending_trend,
};
pub use summary::{build_summary_prompt, generate_summary, AI_UNAVAILABLE_MESSAGE};
pub use types::{Insight, InsightKind, Severity};
