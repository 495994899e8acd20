//! Settings for insight thresholds, budget status, and the AI collaborator
//!
//! Settings are resolved in two layers:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/smartfinance/config.toml)
//! 2. Built-in defaults
//!
//! Every key is optional; missing keys keep their default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Thresholds used by the insight rules
#[derive(Debug, Clone, PartialEq)]
pub struct InsightSettings {
    /// Month-over-month expense delta that triggers a trend insight
    pub trend_threshold: f64,
    /// How many prior months the trend looks back over
    pub trend_months: u32,
    /// Users with fewer transactions than this get beginner guidance
    pub beginner_transaction_count: i64,
    /// Top-two category share of total expense that counts as concentrated
    pub concentration_percent: f64,
    /// Expense/income ratio below which spending is praised
    pub low_expense_ratio: f64,
    /// Expense/income ratio above which spending is flagged
    pub high_expense_ratio: f64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            trend_threshold: 50.0,
            trend_months: 3,
            beginner_transaction_count: 5,
            concentration_percent: 60.0,
            low_expense_ratio: 50.0,
            high_expense_ratio: 90.0,
        }
    }
}

/// Budget status thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSettings {
    /// Percentage of the limit above which a budget turns to warning
    pub warning_percent: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            warning_percent: 80.0,
        }
    }
}

/// AI collaborator settings
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub timeout: Duration,
    /// Overrides OLLAMA_MODEL when set
    pub model: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            model: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub insights: InsightSettings,
    pub budgets: BudgetSettings,
    pub ai: AiSettings,
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(p) if p.exists() => {
                debug!(path = %p.display(), "Loading settings");
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                Self::from_toml(&content)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parse settings from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

        let mut settings = Settings::default();

        if let Some(insights) = raw.insights {
            let s = &mut settings.insights;
            if let Some(v) = insights.trend_threshold {
                s.trend_threshold = v;
            }
            if let Some(v) = insights.trend_months {
                if v < 2 {
                    return Err(Error::Config(
                        "insights.trend_months must be at least 2".to_string(),
                    ));
                }
                s.trend_months = v;
            }
            if let Some(v) = insights.beginner_transaction_count {
                s.beginner_transaction_count = v;
            }
            if let Some(v) = insights.concentration_percent {
                s.concentration_percent = v;
            }
            if let Some(v) = insights.low_expense_ratio {
                s.low_expense_ratio = v;
            }
            if let Some(v) = insights.high_expense_ratio {
                s.high_expense_ratio = v;
            }
        }

        if let Some(budgets) = raw.budgets {
            if let Some(v) = budgets.warning_percent {
                settings.budgets.warning_percent = v;
            }
        }

        if let Some(ai) = raw.ai {
            if let Some(secs) = ai.timeout_secs {
                settings.ai.timeout = Duration::from_secs(secs);
            }
            settings.ai.model = ai.model.filter(|m| !m.trim().is_empty());
        }

        Ok(settings)
    }
}

/// Default settings override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smartfinance").join("config.toml"))
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    insights: Option<RawInsights>,
    budgets: Option<RawBudgets>,
    ai: Option<RawAi>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    trend_threshold: Option<f64>,
    trend_months: Option<u32>,
    beginner_transaction_count: Option<i64>,
    concentration_percent: Option<f64>,
    low_expense_ratio: Option<f64>,
    high_expense_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBudgets {
    warning_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    timeout_secs: Option<u64>,
    model: Option<String>,
}
