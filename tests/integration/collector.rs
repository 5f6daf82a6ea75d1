use std::sync::Arc;
use std::time::Duration;

use hostwatch::alert::AlertKind;
use hostwatch::collector::{Collector, RunSummary};
use hostwatch::config::Config;
use hostwatch::store::SeriesStore;
use tempfile::TempDir;

use crate::common::ScriptedSource;

fn config(tmp: &TempDir) -> Config {
    Config { log_dir: tmp.path().join("logs"), ..Config::default() }
}

#[tokio::test(start_paused = true)]
async fn test_collector_records_throughput_and_alerts() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let config = config(&tmp);
    let store = Arc::new(SeriesStore::open(&config.log_dir)?);

    // 3 s window: 3072 bytes -> 8.0 kbps, 384 bytes -> 1.0 kbps
    let source = ScriptedSource::new([20.0, 85.0]).traffic_step(3072, 384).battery(64);
    let mut collector = Collector::from_config(source, Arc::clone(&store), &config);

    let first = collector.tick().await?;
    assert!(first.alerts.is_empty());
    assert_eq!(first.record.net_rx_kbps, 8.0);
    assert_eq!(first.record.net_tx_kbps, 1.0);
    assert_eq!(first.record.battery_percent, Some(64));

    let second = collector.tick().await?;
    assert_eq!(second.alerts.len(), 1);
    assert_eq!(second.alerts[0].kind, AlertKind::Cpu);
    assert_eq!(second.alerts[0].message, "High CPU: 85.0%");

    assert_eq!(store.load().len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_run_cadence_matches_interval() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let config = config(&tmp);
    let store = Arc::new(SeriesStore::open(&config.log_dir)?);
    let mut collector = Collector::from_config(ScriptedSource::new([5.0]), Arc::clone(&store), &config);

    // 4 s sampling + 11 s pause per tick: ticks start at 0, 15, 30 and 45 s
    let summary = collector.run(tokio::time::sleep(Duration::from_secs(50))).await;

    assert_eq!(summary, RunSummary { recorded: 4, failed: 0, alerts: 0 });
    let series = store.load();
    let stamps: Vec<_> = series.iter().map(|r| r.timestamp.parse()).collect();
    assert!(stamps.iter().all(Option::is_some));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failing_source_writes_nothing() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let config = config(&tmp);
    let store = Arc::new(SeriesStore::open(&config.log_dir)?);
    let mut collector = Collector::from_config(ScriptedSource::new(std::iter::empty()).failing(), Arc::clone(&store), &config);

    let summary = collector.run(tokio::time::sleep(Duration::from_secs(20))).await;

    assert_eq!(summary.recorded, 0);
    assert_eq!(summary.failed, 2);
    assert!(store.load().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_thresholds_flow_into_alerts() -> hostwatch::Result<()> {
    let tmp = TempDir::new()?;
    let mut config = config(&tmp);
    config.thresholds.ram_warn = 30.0;
    config.thresholds.disk_warn = 50.0;
    let store = Arc::new(SeriesStore::open(&config.log_dir)?);

    let source = ScriptedSource::new([1.0]).ram(40.0).disk(50.0);
    let mut collector = Collector::from_config(source, store, &config);

    let report = collector.tick().await?;
    let kinds: Vec<_> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AlertKind::Ram, AlertKind::Disk]);
    Ok(())
}
