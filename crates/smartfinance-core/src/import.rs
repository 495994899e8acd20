//! Statement text import
//!
//! Bank statements arrive as raw text already extracted from a PDF. Each
//! line that carries a date, an amount and a meaningful description becomes
//! an expense; everything else is silently dropped.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionType};

/// Category used when no keyword matches
pub const FALLBACK_CATEGORY: &str = "Others";

const MIN_DESCRIPTION_CHARS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 100;

/// Date token patterns, tried in order
const DATE_PATTERNS: [&str; 3] = [
    r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
    r"\b\d{4}[-/]\d{1,2}[-/]\d{1,2}\b",
    r"(?i)\b\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4}\b",
];

const AMOUNT_PATTERN: &str = r"[₹$]?\s*[\d,]+\.?\d{0,2}";

const DATE_FORMATS: [&str; 8] = [
    "%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%y", "%d/%m/%y", "%d %b %Y", "%d %B %Y",
];

/// Keyword table for category inference; first match wins
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Food & Dining",
        &[
            "restaurant", "cafe", "food", "dining", "swiggy", "zomato", "uber eats", "dominos",
            "pizza", "mcdonald",
        ],
    ),
    (
        "Transportation",
        &[
            "uber", "ola", "taxi", "metro", "bus", "train", "fuel", "petrol", "diesel", "parking",
        ],
    ),
    (
        "Shopping",
        &["amazon", "flipkart", "myntra", "mall", "store", "shopping", "purchase"],
    ),
    (
        "Entertainment",
        &["movie", "cinema", "netflix", "spotify", "prime", "hotstar", "game"],
    ),
    (
        "Utilities",
        &[
            "electricity", "water", "gas", "internet", "phone", "mobile", "broadband", "wifi",
        ],
    ),
    (
        "Healthcare",
        &["hospital", "doctor", "medical", "pharmacy", "medicine", "health"],
    ),
    (
        "Education",
        &["school", "college", "university", "course", "book", "tuition"],
    ),
    (
        "Groceries",
        &[
            "grocery", "supermarket", "reliance fresh", "big bazaar", "dmart", "vegetables",
        ],
    ),
];

/// A transaction recognized in statement text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
}

impl StatementLine {
    pub fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction {
            transaction_type: self.transaction_type,
            category: self.category.clone(),
            amount: self.amount,
            description: Some(self.description.clone()),
            date: self.date,
        }
    }
}

/// Compiled patterns for statement parsing
pub struct StatementParser {
    date_patterns: Vec<Regex>,
    amount: Regex,
}

impl StatementParser {
    pub fn new() -> Result<Self> {
        let date_patterns = DATE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            date_patterns,
            amount: Regex::new(AMOUNT_PATTERN)?,
        })
    }

    /// Parse every recognizable line of `text`
    ///
    /// `today` stands in for dates that match a pattern but no known format.
    pub fn parse_text(&self, text: &str, today: NaiveDate) -> Vec<StatementLine> {
        let lines: Vec<StatementLine> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|l| self.parse_line(l, today))
            .collect();
        debug!(count = lines.len(), "Parsed statement text");
        lines
    }

    /// Parse a single trimmed line, or None when it is not a transaction
    pub fn parse_line(&self, line: &str, today: NaiveDate) -> Option<StatementLine> {
        for pattern in &self.date_patterns {
            let Some(date_match) = pattern.find(line) else {
                continue;
            };
            let date_token = date_match.as_str();
            let rest = line.replace(date_token, "");

            let amount_tokens: Vec<&str> = self.amount.find_iter(&rest).map(|m| m.as_str()).collect();
            let Some(last) = amount_tokens.last() else {
                continue;
            };
            let Some(amount) = parse_amount(last) else {
                continue;
            };
            if amount <= 0.0 {
                continue;
            }

            let mut description = rest.trim().to_string();
            for token in &amount_tokens {
                description = description.replace(token, "").trim().to_string();
            }
            let description = description.split_whitespace().collect::<Vec<_>>().join(" ");

            if description.chars().count() <= MIN_DESCRIPTION_CHARS {
                continue;
            }

            let description: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
            return Some(StatementLine {
                date: parse_statement_date(date_token).unwrap_or(today),
                category: categorize(&description).to_string(),
                description,
                amount,
                transaction_type: TransactionType::Expense,
            });
        }
        None
    }
}

/// Parse statement text with a freshly compiled [`StatementParser`]
pub fn parse_statement_text(text: &str, today: NaiveDate) -> Result<Vec<StatementLine>> {
    Ok(StatementParser::new()?.parse_text(text, today))
}

fn parse_amount(token: &str) -> Option<f64> {
    token
        .replace(['₹', '$', ','], "")
        .trim()
        .parse::<f64>()
        .ok()
}

/// Parse a matched date token; two-digit years only match the `%y` formats
pub fn parse_statement_date(token: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(token, fmt)
            .ok()
            .filter(|d| !fmt.contains("%Y") || d.year() >= 1000)
    })
}

/// Infer a category from keywords in a description
pub fn categorize(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

impl Database {
    /// Store parsed statement lines for a user in one SQLite transaction
    pub fn import_statement_lines(
        &self,
        user_id: i64,
        lines: &[StatementLine],
    ) -> Result<Vec<Transaction>> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            ids.push(Self::insert_transaction_with(
                &db_tx,
                user_id,
                &line.to_new_transaction(),
            )?);
        }
        db_tx.commit()?;
        drop(conn);

        info!(user_id, count = ids.len(), "Imported statement lines");

        let mut imported = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(tx) = self.get_transaction(user_id, id)? {
                imported.push(tx);
            }
        }
        Ok(imported)
    }
}
