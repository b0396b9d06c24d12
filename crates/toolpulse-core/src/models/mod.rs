//! Data models for toolpulse

pub mod event;
pub mod partition;
pub mod window;

pub use event::{now_timestamp, AnalyticsEvent, ErrorCategory, TOOL_REGISTRY};
pub use partition::{DailyPartition, SCHEMA_VERSION};
pub use window::{today, DateWindow};
