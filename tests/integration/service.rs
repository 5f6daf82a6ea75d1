use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;
use hostwatch::alert::{AlertThresholds, Status};
use hostwatch::query::QueryEngine;
use hostwatch::service::{FixedClock, QueryService, Response};
use hostwatch::store::SeriesStore;
use serde_json::json;
use tempfile::TempDir;

use crate::common::RecordBuilder;

fn noon() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(12, 0, 0)).expect("valid date"))
}

fn seeded(tmp: &TempDir) -> hostwatch::Result<QueryService> {
    let store = SeriesStore::open(tmp.path())?;
    store.append(&RecordBuilder::new("2025-03-01T10:00:00").cpu(99.0).build())?;
    store.append(&RecordBuilder::new("2025-03-01T11:15:00").cpu(10.0).ram(70.0).build())?;
    store.append(&RecordBuilder::new("2025-03-01T11:45:00").cpu(50.0).ram(80.0).build())?;
    store.append(&RecordBuilder::new("2025-03-01T12:00:00").cpu(90.0).ram(90.0).disk(95.0).build())?;

    let reader = Arc::new(SeriesStore::new(tmp.path()));
    Ok(QueryService::with_clock(reader, QueryEngine::new(AlertThresholds::default()), noon()))
}

#[test]
fn test_current_over_seeded_store() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let service = seeded(&tmp)?;

    let current = service.current().into_payload().expect("data available");
    assert_eq!(current.status, Status::Alert);
    let messages: Vec<_> = current.alerts.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, ["High CPU: 90.0%", "High RAM: 90.0%", "High Disk: 95.0%"]);
    Ok(())
}

#[test]
fn test_history_windows() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let service = seeded(&tmp)?;

    assert_eq!(service.history(1).payload().map(|h| h.data.len()), Some(3));
    assert_eq!(service.history(24).payload().map(|h| h.data.len()), Some(4));
    Ok(())
}

#[test]
fn test_stats_over_last_hour() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let service = seeded(&tmp)?;

    let value = serde_json::to_value(service.stats())?;
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["cpu"], json!({"current": 90.0, "avg": 50.0, "max": 90.0, "min": 10.0}));
    assert_eq!(value["data"]["ram"], json!({"current": 90.0, "avg": 80.0, "max": 90.0, "min": 70.0}));
    Ok(())
}

#[test]
fn test_corrupt_store_reads_as_no_data() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let service = seeded(&tmp)?;
    fs::write(tmp.path().join(hostwatch::store::SERIES_FILE), "not json\n")?;

    assert_eq!(service.current(), Response::no_data());
    assert_eq!(service.history(1), Response::no_data());
    assert_eq!(service.stats(), Response::no_data());
    Ok(())
}
