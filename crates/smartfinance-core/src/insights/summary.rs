//! Generative-text summary of a user's finances
//!
//! The summary is decoration on top of the rule-based insights. Any failure
//! of the AI backend degrades to [`AI_UNAVAILABLE_MESSAGE`] and never aborts
//! the surrounding insight computation.

use std::fmt::Write as _;

use tracing::{debug, warn};

use super::types::Insight;
use crate::ai::{AIBackend, AIClient};
use crate::models::CategoryTotal;

/// Shown in place of the summary whenever the assistant cannot answer
pub const AI_UNAVAILABLE_MESSAGE: &str =
    "AI assistant is currently unavailable. Your rule-based insights are shown above.";

/// How many categories the prompt lists
const PROMPT_CATEGORY_LIMIT: usize = 5;

/// Build the prompt sent to the summary model
pub fn build_summary_prompt(
    income: f64,
    expense: f64,
    top_categories: &[CategoryTotal],
    insights: &[Insight],
) -> String {
    let mut prompt = String::from(
        "You are a friendly personal finance assistant. Write a short summary \
         (at most 3 sentences) of the user's finances with one practical suggestion.\n\n",
    );

    let _ = writeln!(prompt, "Total income: ${:.2}", income);
    let _ = writeln!(prompt, "Total expenses: ${:.2}", expense);
    let _ = writeln!(prompt, "Balance: ${:.2}", income - expense);

    if !top_categories.is_empty() {
        prompt.push_str("\nTop spending categories:\n");
        for cat in top_categories.iter().take(PROMPT_CATEGORY_LIMIT) {
            let _ = writeln!(prompt, "- {}: ${:.2}", cat.category, cat.total);
        }
    }

    if !insights.is_empty() {
        prompt.push_str("\nObservations:\n");
        for insight in insights {
            let _ = writeln!(prompt, "- {}", insight.message);
        }
    }

    prompt
}

/// Responses some backends return as text instead of an error status
fn is_error_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("error") || lower.starts_with("[error")
}

/// Ask the AI backend for a summary, falling back to the unavailable message
pub async fn generate_summary(ai: Option<&AIClient>, prompt: &str) -> String {
    let Some(client) = ai else {
        debug!("No AI backend configured, using fallback summary");
        return AI_UNAVAILABLE_MESSAGE.to_string();
    };

    match client.summarize(prompt).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() || is_error_marker(text) {
                warn!(model = client.model(), "AI summary was empty or an error marker");
                AI_UNAVAILABLE_MESSAGE.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            warn!(model = client.model(), host = client.host(), error = %e, "AI summary failed");
            AI_UNAVAILABLE_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::insights::{InsightKind, Severity};

    fn categories() -> Vec<CategoryTotal> {
        (1..=7)
            .map(|i| CategoryTotal {
                category: format!("Cat{}", i),
                total: 100.0 - i as f64,
            })
            .collect()
    }

    #[test]
    fn test_prompt_contains_totals_categories_and_insights() {
        let insights = vec![Insight::new(
            InsightKind::TopCategory,
            Severity::Info,
            "Your top spending category is \"Cat1\" with $99.00.",
        )];
        let prompt = build_summary_prompt(1000.0, 250.5, &categories(), &insights);

        assert!(prompt.contains("Total income: $1000.00"));
        assert!(prompt.contains("Total expenses: $250.50"));
        assert!(prompt.contains("Balance: $749.50"));
        assert!(prompt.contains("- Cat1: $99.00"));
        assert!(prompt.contains("- Cat5: $95.00"));
        assert!(!prompt.contains("Cat6"));
        assert!(prompt.contains("Your top spending category"));
    }

    #[test]
    fn test_prompt_omits_empty_sections() {
        let prompt = build_summary_prompt(0.0, 0.0, &[], &[]);
        assert!(!prompt.contains("Top spending categories"));
        assert!(!prompt.contains("Observations"));
    }

    #[tokio::test]
    async fn test_no_backend_falls_back() {
        assert_eq!(generate_summary(None, "hi").await, AI_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_backend_text_is_returned_trimmed() {
        let client = AIClient::Mock(MockBackend::with_response("  You saved well.  "));
        assert_eq!(generate_summary(Some(&client), "p").await, "You saved well.");
    }

    #[tokio::test]
    async fn test_failing_backend_falls_back() {
        let client = AIClient::Mock(MockBackend::unhealthy());
        assert_eq!(generate_summary(Some(&client), "p").await, AI_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_and_error_marker_fall_back() {
        let empty = AIClient::Mock(MockBackend::with_response("   "));
        assert_eq!(generate_summary(Some(&empty), "p").await, AI_UNAVAILABLE_MESSAGE);

        let marker = AIClient::Mock(MockBackend::with_response("Error: quota exceeded"));
        assert_eq!(generate_summary(Some(&marker), "p").await, AI_UNAVAILABLE_MESSAGE);
    }
}
