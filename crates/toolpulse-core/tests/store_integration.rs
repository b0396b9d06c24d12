//! Integration tests for the event store through the public API

use chrono::Duration;
use std::sync::Arc;
use tempfile::TempDir;
use toolpulse_core::models::today;
use toolpulse_core::{AnalyticsConfig, AnalyticsEvent, ErrorCategory, EventStore};

fn config(dir: &std::path::Path) -> AnalyticsConfig {
    AnalyticsConfig::with_data_dir(dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(EventStore::new(config(tmp.path())));

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let event = AnalyticsEvent::success("format_code", 10.0, format!("s-{}", i));
                store.append_event(event).await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap();
        assert!(outcome.success, "append failed: {:?}", outcome.error);
        assert_eq!(outcome.events_written, 1);
    }

    let read = store.read_events(None, None).await;
    assert!(read.success);
    assert_eq!(read.events.len(), 24);

    // No lock or temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".lock") || name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_store_instances_share_partitions() {
    let tmp = TempDir::new().unwrap();
    let first = EventStore::new(config(tmp.path()));
    let second = EventStore::new(config(tmp.path()));

    let (a, b) = tokio::join!(
        first.append_events(vec![
            AnalyticsEvent::success("search_docs", 1.0, "a"),
            AnalyticsEvent::success("search_docs", 2.0, "a"),
        ]),
        second.append_event(AnalyticsEvent::failure(
            "search_docs",
            3.0,
            "b",
            ErrorCategory::Timeout
        )),
    );
    assert!(a.success && b.success);

    let events = second.read_events(None, None).await.events;
    assert_eq!(events.len(), 3);
    assert_eq!(events.iter().filter(|e| !e.success).count(), 1);
}

#[tokio::test]
async fn test_partition_file_format() {
    let tmp = TempDir::new().unwrap();
    let store = EventStore::new(config(tmp.path()));
    let day = today();

    let event = AnalyticsEvent::failure("review_changes", 250.0, "s-1", ErrorCategory::Validation)
        .at(format!("{}T08:15:00.000Z", day));
    assert!(store.append_event(event).await.success);

    let path = tmp.path().join(format!("usage-{}.json", day));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(json["schemaVersion"], "1.0.0");
    assert_eq!(json["date"], day.to_string());
    assert!(json["lastModified"].is_string());
    let stored = &json["events"][0];
    assert_eq!(stored["toolName"], "review_changes");
    assert_eq!(stored["durationMs"], 250.0);
    assert_eq!(stored["errorCategory"], "validation");
}

#[tokio::test]
async fn test_reads_partitions_written_by_other_producers() {
    let tmp = TempDir::new().unwrap();
    let day = today() - Duration::days(2);
    let body = format!(
        r#"{{
  "schemaVersion": "1.0.0",
  "date": "{day}",
  "events": [
    {{"toolName": "explain_error", "timestamp": "{day}T12:00:00.000Z", "success": true, "durationMs": 80, "sessionId": "ext"}}
  ],
  "lastModified": "{day}T12:00:00.000Z"
}}"#
    );
    std::fs::write(tmp.path().join(format!("usage-{}.json", day)), body).unwrap();
    // Unrelated files in the directory are ignored
    std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

    let store = EventStore::new(config(tmp.path()));
    let read = store.read_events(None, None).await;
    assert!(read.success);
    assert_eq!(read.events.len(), 1);
    assert_eq!(read.events[0].tool_name, "explain_error");

    let info = store.storage_info().await;
    assert_eq!(info.total_files, 1);
    assert_eq!(info.oldest_date, Some(day));
}

#[tokio::test]
async fn test_retention_cleanup_matches_dry_run() {
    let tmp = TempDir::new().unwrap();
    let store = EventStore::new(AnalyticsConfig {
        retention_days: 10,
        ..config(tmp.path())
    });
    let day = today();

    let mut events = Vec::new();
    for offset in [0, 9, 10, 11, 30] {
        let date = day - Duration::days(offset);
        events.push(AnalyticsEvent::success("a", 1.0, "s").at(format!("{}T00:00:00.000Z", date)));
        events.push(AnalyticsEvent::success("b", 1.0, "s").at(format!("{}T01:00:00.000Z", date)));
    }
    assert_eq!(store.append_events(events).await.events_written, 10);

    let preview = store.run_cleanup(true).await;
    assert!(preview.dry_run);
    assert_eq!(preview.cutoff_date, day - Duration::days(10));
    assert_eq!(
        preview.removed_dates,
        vec![day - Duration::days(30), day - Duration::days(11)]
    );
    assert_eq!(store.storage_info().await.total_files, 5);

    let real = store.run_cleanup(false).await;
    assert!(real.success);
    assert_eq!(real.files_removed, preview.files_removed);
    assert_eq!(real.events_removed, preview.events_removed);
    assert_eq!(real.removed_dates, preview.removed_dates);

    let info = store.storage_info().await;
    assert_eq!(info.total_files, 3);
    assert_eq!(info.total_events, 6);
    assert_eq!(info.oldest_date, Some(day - Duration::days(10)));
}
