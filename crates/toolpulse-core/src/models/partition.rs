//! Per-date partition document
//!
//! One JSON file per calendar date:
//! `{schemaVersion, date, events, lastModified}`.

use serde::{Deserialize, Serialize};

use super::event::{now_timestamp, AnalyticsEvent};

/// Version written into every new partition
pub const SCHEMA_VERSION: &str = "1.0.0";

/// All events recorded on one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPartition {
    pub schema_version: String,
    /// YYYY-MM-DD
    pub date: String,
    #[serde(default)]
    pub events: Vec<AnalyticsEvent>,
    pub last_modified: String,
}

impl DailyPartition {
    /// Empty partition for `date`
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            date: date.into(),
            events: Vec::new(),
            last_modified: now_timestamp(),
        }
    }

    /// Append events and stamp `lastModified`
    pub fn append(&mut self, events: impl IntoIterator<Item = AnalyticsEvent>) {
        self.events.extend(events);
        self.last_modified = now_timestamp();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_serializes_camel_case() {
        let mut partition = DailyPartition::new("2026-05-01");
        partition.append(vec![AnalyticsEvent::success("search_docs", 10.0, "s")
            .at("2026-05-01T08:00:00.000Z")]);

        let json = serde_json::to_value(&partition).unwrap();
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(json["date"], "2026-05-01");
        assert!(json["lastModified"].is_string());
        assert_eq!(json["events"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_events_field_defaults_to_empty() {
        let raw = r#"{"schemaVersion":"1.0.0","date":"2026-05-01","lastModified":"2026-05-01T00:00:00.000Z"}"#;
        let partition: DailyPartition = serde_json::from_str(raw).unwrap();
        assert!(partition.is_empty());
    }
}
