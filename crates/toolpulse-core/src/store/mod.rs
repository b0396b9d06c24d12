//! Date-partitioned event store
//!
//! One JSON document per UTC calendar date. Writers serialize per partition
//! through [`PartitionLock`] and replace files atomically; readers never lock
//! and may miss events appended concurrently.
//!
//! Every public operation returns an outcome value instead of an error. A
//! partition that cannot be parsed is treated as holding no events.
//!
//! Scaling note: reads and cleanup are linear in the number of partition files
//! touched, there is no index and no reader isolation.

mod atomic;
mod layout;
mod lock;

pub use atomic::write_atomic;
pub use layout::{PartitionFile, PartitionLayout, LOCK_SUFFIX, TEMP_SUFFIX};
pub use lock::PartitionLock;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::error::StoreError;
use crate::models::{today, AnalyticsEvent, DailyPartition, DateWindow};

/// Result of [`EventStore::append_events`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendOutcome {
    pub success: bool,
    /// Events durably committed by this call
    pub events_written: usize,
    /// Events dropped by validation (bad timestamp, negative duration, ...)
    pub events_rejected: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`EventStore::read_events`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutcome {
    pub success: bool,
    pub events: Vec<AnalyticsEvent>,
    pub date_range: DateWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`EventStore::run_cleanup`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    pub success: bool,
    pub dry_run: bool,
    /// Partitions strictly older than this date are removed
    pub cutoff_date: NaiveDate,
    pub files_removed: usize,
    pub events_removed: usize,
    pub removed_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`EventStore::delete_all_data`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub success: bool,
    pub files_deleted: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`EventStore::storage_info`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub success: bool,
    pub data_dir: PathBuf,
    pub total_files: usize,
    pub total_events: usize,
    pub total_size_bytes: u64,
    pub oldest_date: Option<NaiveDate>,
    pub newest_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Durable, append-only store of [`AnalyticsEvent`]s
#[derive(Debug, Clone)]
pub struct EventStore {
    config: AnalyticsConfig,
    layout: PartitionLayout,
}

impl EventStore {
    pub fn new(config: AnalyticsConfig) -> Self {
        let layout = PartitionLayout::new(&config);
        Self { config, layout }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        self.layout.dir()
    }

    /// Date below which partitions are pruned: `today - retention_days`
    pub fn cutoff_date(&self) -> NaiveDate {
        today() - Duration::days(i64::from(self.config.retention_days))
    }

    /// Append one event
    pub async fn append_event(&self, event: AnalyticsEvent) -> AppendOutcome {
        self.append_events(vec![event]).await
    }

    /// Append events, grouped into their date partitions
    ///
    /// Groups are committed in ascending date order. If a group fails, the
    /// call stops and reports the events written so far; earlier groups stay
    /// committed.
    pub async fn append_events(&self, events: Vec<AnalyticsEvent>) -> AppendOutcome {
        let mut outcome = AppendOutcome {
            success: true,
            ..AppendOutcome::default()
        };

        let mut groups: BTreeMap<String, Vec<AnalyticsEvent>> = BTreeMap::new();
        for event in events {
            if let Err(reason) = event.validate() {
                warn!(tool = %event.tool_name, reason = %reason, "Rejecting analytics event");
                outcome.events_rejected += 1;
                continue;
            }
            let Some(date) = event.date_key().map(str::to_string) else {
                outcome.events_rejected += 1;
                continue;
            };
            groups.entry(date).or_default().push(event);
        }

        for (date, group) in groups {
            let count = group.len();
            match self.append_to_partition(&date, group).await {
                Ok(()) => {
                    outcome.events_written += count;
                    debug!(date = %date, count, "Appended events to partition");
                }
                Err(e) => {
                    warn!(date = %date, error = %e, "Failed to append events");
                    outcome.success = false;
                    outcome.error = Some(e.to_string());
                    break;
                }
            }
        }

        outcome
    }

    /// Locked read-modify-write of one partition
    async fn append_to_partition(
        &self,
        date: &str,
        events: Vec<AnalyticsEvent>,
    ) -> Result<(), StoreError> {
        let path = self.layout.partition_path(date);

        tokio::fs::create_dir_all(self.layout.dir())
            .await
            .map_err(|source| StoreError::FileWrite {
                path: self.layout.dir().to_path_buf(),
                source,
            })?;

        let lock = PartitionLock::acquire(
            self.layout.lock_path(&path),
            self.config.lock_timeout(),
            self.config.lock_retry_interval(),
        )
        .await?;

        let result = self.write_partition_locked(&path, date, events).await;
        let released = lock.release().await;

        result?;
        released
    }

    async fn write_partition_locked(
        &self,
        path: &Path,
        date: &str,
        events: Vec<AnalyticsEvent>,
    ) -> Result<(), StoreError> {
        let mut partition = match read_partition(path).await {
            Ok(partition) => partition,
            Err(e) if e.is_not_found() => DailyPartition::new(date),
            Err(e @ StoreError::JsonParse { .. }) => {
                // Keep the unreadable bytes for inspection instead of overwriting them
                let aside = self.layout.corrupt_path(path);
                warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Partition unreadable, starting a fresh one"
                );
                tokio::fs::rename(path, &aside)
                    .await
                    .map_err(|source| StoreError::FileWrite {
                        path: aside.clone(),
                        source,
                    })?;
                DailyPartition::new(date)
            }
            Err(e) => return Err(e),
        };

        partition.append(events);

        let json = serde_json::to_vec_pretty(&partition).map_err(|source| StoreError::Serialize {
            date: date.to_string(),
            source,
        })?;

        write_atomic(path, &self.layout.temp_path(path), &json).await
    }

    /// Read events in `[start, end]`, sorted by timestamp
    ///
    /// Defaults to `[today - retention_days, today]`.
    pub async fn read_events(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ReadOutcome {
        let window = DateWindow::resolve(start, end, self.config.retention_days);

        let scan = match self.layout.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                warn!(error = %e, "Failed to list partitions");
                return ReadOutcome {
                    success: false,
                    events: Vec::new(),
                    date_range: window,
                    error: Some(e.to_string()),
                };
            }
        };

        let mut events = Vec::new();
        for partition in scan.partitions.iter().filter(|p| window.contains(p.date)) {
            events.extend(read_partition_or_empty(&partition.path).await.events);
        }

        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        debug!(window = %window, count = events.len(), "Read events");

        ReadOutcome {
            success: true,
            events,
            date_range: window,
            error: None,
        }
    }

    /// Remove partitions strictly older than `today - retention_days`
    ///
    /// Set-aside `.corrupt` files older than the cutoff go too, counted as
    /// files with no events. With `dry_run` nothing is deleted; the outcome
    /// reports what would be.
    pub async fn run_cleanup(&self, dry_run: bool) -> CleanupOutcome {
        let cutoff_date = self.cutoff_date();
        let mut outcome = CleanupOutcome {
            success: true,
            dry_run,
            cutoff_date,
            files_removed: 0,
            events_removed: 0,
            removed_dates: Vec::new(),
            error: None,
        };

        let scan = match self.layout.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                outcome.success = false;
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        for partition in scan.partitions.iter().filter(|p| p.date < cutoff_date) {
            let event_count = read_partition_or_empty(&partition.path).await.len();

            if !dry_run {
                if let Err(source) = tokio::fs::remove_file(&partition.path).await {
                    let e = StoreError::FileRemove {
                        path: partition.path.clone(),
                        source,
                    };
                    warn!(error = %e, "Cleanup failed to remove partition");
                    outcome.success = false;
                    outcome.error.get_or_insert_with(|| e.to_string());
                    continue;
                }
            }

            outcome.files_removed += 1;
            outcome.events_removed += event_count;
            outcome.removed_dates.push(partition.date);
        }

        // Set-aside partitions age out with the date they belonged to
        for corrupt in scan.corrupt_files.iter().filter(|p| p.date < cutoff_date) {
            if !dry_run {
                if let Err(source) = tokio::fs::remove_file(&corrupt.path).await {
                    let e = StoreError::FileRemove {
                        path: corrupt.path.clone(),
                        source,
                    };
                    warn!(error = %e, "Cleanup failed to remove corrupt partition");
                    outcome.success = false;
                    outcome.error.get_or_insert_with(|| e.to_string());
                    continue;
                }
            }

            outcome.files_removed += 1;
            outcome.removed_dates.push(corrupt.date);
        }
        outcome.removed_dates.sort_unstable();
        outcome.removed_dates.dedup();

        info!(
            dry_run,
            cutoff = %cutoff_date,
            files = outcome.files_removed,
            events = outcome.events_removed,
            "Retention cleanup finished"
        );

        outcome
    }

    /// Remove every partition, set-aside corrupt partition and leftover temp file
    ///
    /// Lock files are left alone so a writer holding one keeps its exclusivity.
    pub async fn delete_all_data(&self) -> DeleteOutcome {
        let mut outcome = DeleteOutcome {
            success: true,
            ..DeleteOutcome::default()
        };

        let scan = match self.layout.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                outcome.success = false;
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        for partition in scan.partitions.iter().chain(&scan.corrupt_files) {
            match tokio::fs::remove_file(&partition.path).await {
                Ok(()) => outcome.files_deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    let e = StoreError::FileRemove {
                        path: partition.path.clone(),
                        source,
                    };
                    warn!(error = %e, "Failed to delete partition");
                    outcome.success = false;
                    outcome.error.get_or_insert_with(|| e.to_string());
                }
            }
        }

        for temp in &scan.temp_files {
            let _ = tokio::fs::remove_file(temp).await;
        }

        info!(files = outcome.files_deleted, "Deleted all analytics data");
        outcome
    }

    /// Partition count, event count, bytes on disk and date span
    pub async fn storage_info(&self) -> StorageInfo {
        let mut info = StorageInfo {
            success: true,
            data_dir: self.layout.dir().to_path_buf(),
            total_files: 0,
            total_events: 0,
            total_size_bytes: 0,
            oldest_date: None,
            newest_date: None,
            error: None,
        };

        let scan = match self.layout.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                info.success = false;
                info.error = Some(e.to_string());
                return info;
            }
        };

        for partition in &scan.partitions {
            info.total_files += 1;
            info.total_size_bytes += partition.size_bytes;
            info.total_events += read_partition_or_empty(&partition.path).await.len();
        }

        info.oldest_date = scan.partitions.first().map(|p| p.date);
        info.newest_date = scan.partitions.last().map(|p| p.date);
        info
    }
}

/// Parse one partition file
async fn read_partition(path: &Path) -> Result<DailyPartition, StoreError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| StoreError::JsonParse {
        path: path.to_path_buf(),
        message: source.to_string(),
        source,
    })
}

/// Parse one partition, degrading any failure to "no events for that date"
async fn read_partition_or_empty(path: &Path) -> DailyPartition {
    match read_partition(path).await {
        Ok(partition) => partition,
        Err(e) => {
            if e.is_not_found() {
                debug!(path = %path.display(), "Partition vanished before read");
            } else {
                warn!(path = %path.display(), error = %e, "Skipping unreadable partition");
            }
            DailyPartition::new(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCategory;
    use tempfile::TempDir;

    fn store(dir: &Path) -> EventStore {
        EventStore::new(AnalyticsConfig::with_data_dir(dir))
    }

    fn event_on(date: NaiveDate, hour: u32, tool: &str) -> AnalyticsEvent {
        AnalyticsEvent::success(tool, 100.0, "session-1")
            .at(format!("{}T{:02}:00:00.000Z", date, hour))
    }

    #[tokio::test]
    async fn test_append_groups_by_date() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();
        let yesterday = day - Duration::days(1);

        let outcome = store
            .append_events(vec![
                event_on(day, 9, "search_docs"),
                event_on(yesterday, 9, "search_docs"),
                event_on(day, 10, "format_code"),
            ])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.events_written, 3);
        assert!(tmp.path().join(format!("usage-{}.json", day)).exists());
        assert!(tmp.path().join(format!("usage-{}.json", yesterday)).exists());

        let read = store.read_events(None, None).await;
        assert!(read.success);
        assert_eq!(read.events.len(), 3);
    }

    #[tokio::test]
    async fn test_append_is_cumulative_and_releases_lock() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();

        store.append_event(event_on(day, 8, "a")).await;
        store.append_event(event_on(day, 9, "b")).await;

        let path = tmp.path().join(format!("usage-{}.json", day));
        let partition: DailyPartition =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(partition.events.len(), 2);
        assert_eq!(partition.date, day.to_string());
        assert!(!tmp.path().join(format!("usage-{}.json.lock", day)).exists());
        assert!(!tmp.path().join(format!("usage-{}.json.tmp", day)).exists());
    }

    #[tokio::test]
    async fn test_append_rejects_invalid_events() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());

        let outcome = store
            .append_events(vec![
                AnalyticsEvent::success("a", 1.0, "s").at("not-a-date"),
                AnalyticsEvent::success("a", -5.0, "s"),
                AnalyticsEvent::success("a", 5.0, "s"),
            ])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.events_written, 1);
        assert_eq!(outcome.events_rejected, 2);
    }

    #[tokio::test]
    async fn test_append_empty_is_noop() {
        let tmp = TempDir::new().unwrap();
        let outcome = store(tmp.path()).append_events(Vec::new()).await;
        assert!(outcome.success);
        assert_eq!(outcome.events_written, 0);
    }

    #[tokio::test]
    async fn test_lock_timeout_reports_partial_progress() {
        let tmp = TempDir::new().unwrap();
        let config = AnalyticsConfig {
            lock_timeout_ms: 100,
            lock_retry_interval_ms: 10,
            ..AnalyticsConfig::with_data_dir(tmp.path())
        };
        let store = EventStore::new(config);
        let day = today();
        let yesterday = day - Duration::days(1);

        // Hold today's lock with a future mtime so it never looks stale
        let lock_path = tmp.path().join(format!("usage-{}.json.lock", day));
        std::fs::write(&lock_path, "424242").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&lock_path)
            .unwrap()
            .set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(3600))
            .unwrap();

        let outcome = store
            .append_events(vec![event_on(yesterday, 9, "a"), event_on(day, 9, "b")])
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.events_written, 1, "earlier group stays committed");
        assert!(outcome.error.unwrap().contains("timeout"));
        assert!(tmp.path().join(format!("usage-{}.json", yesterday)).exists());
        assert!(!tmp.path().join(format!("usage-{}.json", day)).exists());
    }

    #[tokio::test]
    async fn test_read_empty_store() {
        let tmp = TempDir::new().unwrap();
        let read = store(&tmp.path().join("never-created")).read_events(None, None).await;
        assert!(read.success);
        assert!(read.events.is_empty());
        assert!(read.error.is_none());
    }

    #[tokio::test]
    async fn test_read_sorts_by_timestamp() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();

        store
            .append_events(vec![
                event_on(day, 15, "late"),
                event_on(day, 3, "early"),
                event_on(day - Duration::days(2), 23, "earliest"),
            ])
            .await;

        let tools: Vec<String> = store
            .read_events(None, None)
            .await
            .events
            .into_iter()
            .map(|e| e.tool_name)
            .collect();
        assert_eq!(tools, vec!["earliest", "early", "late"]);
    }

    #[tokio::test]
    async fn test_read_respects_window() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();

        store
            .append_events(vec![
                event_on(day, 1, "today"),
                event_on(day - Duration::days(5), 1, "five"),
                event_on(day - Duration::days(10), 1, "ten"),
            ])
            .await;

        let read = store
            .read_events(Some(day - Duration::days(6)), Some(day - Duration::days(1)))
            .await;
        assert_eq!(read.events.len(), 1);
        assert_eq!(read.events[0].tool_name, "five");
    }

    #[tokio::test]
    async fn test_corrupt_partition_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();
        let yesterday = day - Duration::days(1);

        store.append_event(event_on(day, 1, "ok")).await;
        std::fs::write(
            tmp.path().join(format!("usage-{}.json", yesterday)),
            "{ not json",
        )
        .unwrap();

        let read = store.read_events(None, None).await;
        assert!(read.success);
        assert_eq!(read.events.len(), 1);
    }

    #[tokio::test]
    async fn test_append_to_corrupt_partition_sets_it_aside() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();
        let path = tmp.path().join(format!("usage-{}.json", day));
        std::fs::write(&path, "garbage").unwrap();

        let outcome = store.append_event(event_on(day, 1, "a")).await;
        assert!(outcome.success);
        assert!(tmp.path().join(format!("usage-{}.json.corrupt", day)).exists());
        assert_eq!(store.read_events(None, None).await.events.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_data_removes_set_aside_partitions() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();
        std::fs::write(tmp.path().join(format!("usage-{}.json", day)), "garbage").unwrap();
        assert!(store.append_event(event_on(day, 1, "a")).await.success);

        let outcome = store.delete_all_data().await;
        assert!(outcome.success);
        assert_eq!(outcome.files_deleted, 2);

        let left: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert!(left.is_empty(), "left on disk: {:?}", left);
    }

    #[tokio::test]
    async fn test_cleanup_prunes_old_set_aside_partitions() {
        let tmp = TempDir::new().unwrap();
        let store = EventStore::new(AnalyticsConfig {
            retention_days: 7,
            ..AnalyticsConfig::with_data_dir(tmp.path())
        });
        let old = today() - Duration::days(30);
        let recent = today() - Duration::days(2);
        let old_corrupt = tmp.path().join(format!("usage-{}.json.corrupt", old));
        let recent_corrupt = tmp.path().join(format!("usage-{}.json.corrupt", recent));
        std::fs::write(&old_corrupt, "garbage").unwrap();
        std::fs::write(&recent_corrupt, "garbage").unwrap();
        store.append_event(event_on(old, 1, "old")).await;

        let dry = store.run_cleanup(true).await;
        assert_eq!(dry.files_removed, 2);
        assert_eq!(dry.events_removed, 1);
        assert_eq!(dry.removed_dates, vec![old]);
        assert!(old_corrupt.exists(), "dry run deletes nothing");

        let real = store.run_cleanup(false).await;
        assert!(real.success);
        assert_eq!(real.files_removed, dry.files_removed);
        assert_eq!(real.removed_dates, dry.removed_dates);
        assert!(!old_corrupt.exists());
        assert!(recent_corrupt.exists());
    }

    #[tokio::test]
    async fn test_cleanup_dry_run_then_real() {
        let tmp = TempDir::new().unwrap();
        let config = AnalyticsConfig {
            retention_days: 7,
            ..AnalyticsConfig::with_data_dir(tmp.path())
        };
        let store = EventStore::new(config);
        let day = today();

        store
            .append_events(vec![
                event_on(day, 1, "keep"),
                event_on(day - Duration::days(7), 1, "keep-boundary"),
                event_on(day - Duration::days(8), 1, "old"),
                event_on(day - Duration::days(8), 2, "old"),
                event_on(day - Duration::days(30), 1, "older"),
            ])
            .await;

        let dry = store.run_cleanup(true).await;
        assert!(dry.success);
        assert!(dry.dry_run);
        assert_eq!(dry.files_removed, 2);
        assert_eq!(dry.events_removed, 3);
        assert_eq!(store.storage_info().await.total_files, 4, "dry run deletes nothing");

        let real = store.run_cleanup(false).await;
        assert!(real.success);
        assert_eq!(real.files_removed, dry.files_removed);
        assert_eq!(real.events_removed, dry.events_removed);
        assert_eq!(real.removed_dates, dry.removed_dates);

        let info = store.storage_info().await;
        assert_eq!(info.total_files, 2);
        assert_eq!(info.total_events, 2);
    }

    #[tokio::test]
    async fn test_delete_all_data() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();

        store
            .append_events(vec![
                event_on(day, 1, "a"),
                event_on(day - Duration::days(1), 1, "b"),
            ])
            .await;
        std::fs::write(tmp.path().join(format!("usage-{}.json.tmp", day)), "{").unwrap();
        let held_lock = tmp.path().join(format!("usage-{}.json.lock", day));
        std::fs::write(&held_lock, "4242").unwrap();

        let outcome = store.delete_all_data().await;
        assert!(outcome.success);
        assert_eq!(outcome.files_deleted, 2);
        assert!(store.read_events(None, None).await.events.is_empty());
        assert!(!tmp.path().join(format!("usage-{}.json.tmp", day)).exists());
        assert!(held_lock.exists(), "purge leaves lock files to their holders");
    }

    #[tokio::test]
    async fn test_storage_info() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let day = today();
        let earlier = day - Duration::days(3);

        store
            .append_events(vec![
                event_on(day, 1, "a"),
                event_on(day, 2, "a"),
                AnalyticsEvent::failure("b", 10.0, "s", ErrorCategory::Runtime)
                    .at(format!("{}T05:00:00.000Z", earlier)),
            ])
            .await;

        let info = store.storage_info().await;
        assert!(info.success);
        assert_eq!(info.total_files, 2);
        assert_eq!(info.total_events, 3);
        assert!(info.total_size_bytes > 0);
        assert_eq!(info.oldest_date, Some(earlier));
        assert_eq!(info.newest_date, Some(day));
    }

    #[tokio::test]
    async fn test_outcome_wire_names() {
        let outcome = AppendOutcome {
            success: false,
            events_written: 2,
            events_rejected: 0,
            error: Some("boom".to_string()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["eventsWritten"], 2);
        assert_eq!(json["error"], "boom");
    }
}
