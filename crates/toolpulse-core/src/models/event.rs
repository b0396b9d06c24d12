//! Recorded tool invocation events
//!
//! Wire shape (camelCase JSON):
//! `{toolName, timestamp, success, durationMs, sessionId, errorCategory?}`

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tool names tracked by default. Used to detect tools that never appear in a window.
pub const TOOL_REGISTRY: &[&str] = &[
    "analyze_code",
    "explain_error",
    "format_code",
    "generate_tests",
    "refactor_code",
    "review_changes",
    "search_docs",
    "summarize_diff",
];

/// Closed set of failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Runtime,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    /// All categories, in display order
    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Validation,
        ErrorCategory::Runtime,
        ErrorCategory::Timeout,
        ErrorCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Runtime => "runtime",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded invocation of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub tool_name: String,
    /// ISO-8601; the first 10 characters are the UTC calendar date
    pub timestamp: String,
    pub success: bool,
    pub duration_ms: f64,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
}

impl AnalyticsEvent {
    /// Successful invocation stamped with the current time
    pub fn success(
        tool_name: impl Into<String>,
        duration_ms: f64,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            timestamp: now_timestamp(),
            success: true,
            duration_ms,
            session_id: session_id.into(),
            error_category: None,
        }
    }

    /// Failed invocation stamped with the current time
    pub fn failure(
        tool_name: impl Into<String>,
        duration_ms: f64,
        session_id: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            timestamp: now_timestamp(),
            success: false,
            duration_ms,
            session_id: session_id.into(),
            error_category: Some(category),
        }
    }

    /// Override the timestamp (backfills, tests)
    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Partition key: the first 10 characters of the timestamp, if they form a date
    pub fn date_key(&self) -> Option<&str> {
        let key = self.timestamp.get(..10)?;
        NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
        Some(key)
    }

    /// Reasons an event must not be persisted
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_name.is_empty() {
            return Err("empty tool name".to_string());
        }
        if self.date_key().is_none() {
            return Err(format!("timestamp '{}' has no calendar date", self.timestamp));
        }
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(format!("invalid duration {}", self.duration_ms));
        }
        Ok(())
    }

    /// Category used for histograms; failures without one count as `unknown`
    pub fn effective_category(&self) -> Option<ErrorCategory> {
        if self.success {
            None
        } else {
            Some(self.error_category.unwrap_or(ErrorCategory::Unknown))
        }
    }
}

/// Current UTC time in the wire format (`2026-10-18T09:30:00.000Z`)
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
