use std::fs;
use std::sync::Arc;
use std::thread;

use hostwatch::store::{SeriesStore, PLAIN_LOG_FILE, SERIES_FILE};
use tempfile::TempDir;

use crate::common::RecordBuilder;

#[test]
fn test_series_survives_reopen() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    {
        let store = SeriesStore::open(tmp.path())?;
        store.append(&RecordBuilder::new("2025-03-01T12:00:00").cpu(12.5).build())?;
        store.append(&RecordBuilder::new("2025-03-01T12:00:15").battery(80).build())?;
    }

    let store = SeriesStore::open(tmp.path())?;
    let series = store.load_checked()?;
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].cpu_percent, 12.5);
    assert_eq!(series.latest().and_then(|r| r.battery_percent), Some(80));
    Ok(())
}

#[test]
fn test_files_on_disk() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let store = SeriesStore::open(tmp.path().join("logs"))?;
    store.append(&RecordBuilder::new("2025-03-01T12:00:00").network(8.0, 1.5).build())?;

    let jsonl = fs::read_to_string(tmp.path().join("logs").join(SERIES_FILE))?;
    assert_eq!(jsonl.lines().count(), 1);
    assert!(jsonl.ends_with('\n'));

    let csv = fs::read_to_string(tmp.path().join("logs").join(PLAIN_LOG_FILE))?;
    assert_eq!(
        csv,
        "timestamp,cpu_percent,ram_percent,disk_percent,net_rx_kbps,net_tx_kbps,battery_percent\n\
         2025-03-01T12:00:00,10.0,20.0,30.0,8.0,1.5,\n"
    );
    Ok(())
}

#[test]
fn test_crash_mid_write_loses_only_the_torn_record() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let store = SeriesStore::open(tmp.path())?;
    store.append(&RecordBuilder::new("2025-03-01T12:00:00").build())?;

    let mut bytes = fs::read(store.series_path())?;
    bytes.extend_from_slice(br#"{"timestamp":"2025-03-01T12:00:15","cpu_per"#);
    fs::write(store.series_path(), bytes)?;
    drop(store);

    let store = SeriesStore::open(tmp.path())?;
    store.append(&RecordBuilder::new("2025-03-01T12:00:30").build())?;

    let series = store.load_checked()?;
    let stamps: Vec<_> = series.iter().map(|r| r.timestamp.to_string()).collect();
    assert_eq!(stamps, ["2025-03-01T12:00:00", "2025-03-01T12:00:30"]);
    Ok(())
}

#[test]
fn test_concurrent_reader_never_sees_partial_records() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let writer = Arc::new(SeriesStore::open(tmp.path())?);
    let reader = SeriesStore::new(tmp.path());

    let handle = {
        let writer = Arc::clone(&writer);
        thread::spawn(move || -> hostwatch::Result<()> {
            for i in 0..200 {
                writer.append(&RecordBuilder::new(&format!("2025-03-01T12:{:02}:{:02}", i / 60, i % 60)).build())?;
            }
            Ok(())
        })
    };

    let mut last = 0;
    for _ in 0..50 {
        let len = reader.load_checked()?.len();
        assert!(len >= last);
        last = len;
    }

    handle.join().expect("writer thread panicked")?;
    assert_eq!(reader.load_checked()?.len(), 200);
    Ok(())
}

#[test]
fn test_export_matches_series() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let store = SeriesStore::open(tmp.path().join("logs"))?;
    for ts in ["2025-03-01T12:00:00", "2025-03-01T12:00:15"] {
        store.append(&RecordBuilder::new(ts).build())?;
    }

    let dest = tmp.path().join("export.json");
    assert_eq!(store.export_snapshot(&dest)?, 2);

    let exported: Vec<hostwatch::core::MetricRecord> = serde_json::from_str(&fs::read_to_string(&dest)?)?;
    assert_eq!(exported, store.load().into_vec());
    Ok(())
}
