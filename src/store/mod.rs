//! # Series Store
//!
//! Append-only persistence for [`MetricRecord`]s.
//!
//! The series lives in a newline-delimited JSON log (`health.jsonl`), one record per line.
//! Appending writes exactly one complete line with a single `write_all` and syncs it;
//! bytes already in the file are never rewritten. A line without its terminating newline
//! is a torn write: loads skip it, and [`SeriesStore::repair`] (run by
//! [`SeriesStore::open`] and before the first append of a handle) truncates it away so the
//! next record starts on a clean line. The plain-text mirror gets the same treatment.
//!
//! A plain-text mirror (`health.csv`) with a fixed header row is kept for humans. The JSON
//! log is authoritative; failing to update the mirror is logged and otherwise ignored.
//!
//! ## Reading
//!
//! [`SeriesStore::load`] never fails: a missing log is an empty series and an unreadable or
//! malformed log is logged at `warn` and also reported as empty. Callers that need to
//! tell "no history" from "broken history" use [`SeriesStore::load_checked`].
//!
//! ```rust,no_run
//! use hostwatch::core::MetricRecord;
//! use hostwatch::store::SeriesStore;
//!
//! fn main() -> hostwatch::Result<()> {
//!     let store = SeriesStore::open("logs")?;
//!     store.append(&MetricRecord::new("2025-03-01T12:00:00", 10.0, 20.0, 30.0, 0.0, 0.0, None))?;
//!     assert!(store.load().latest().is_some());
//!     Ok(())
//! }
//! ```


use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::core::{MetricRecord, Series, CSV_HEADER};
use crate::error::{Error, Result};

/// File name of the structured log inside the store directory
pub const SERIES_FILE: &str = "health.jsonl";

/// File name of the plain-text mirror inside the store directory
pub const PLAIN_LOG_FILE: &str = "health.csv";

#[derive(Debug, Default)]
struct AppendState {
    /// Whether the log is known to end on a line boundary
    repaired: bool,
}

#[derive(Debug)]
pub struct SeriesStore {
    dir: PathBuf,
    series_path: PathBuf,
    plain_log_path: Option<PathBuf>,
    append_state: Mutex<AppendState>,
}

impl SeriesStore {
    /// Handle on the store in `dir` without touching the filesystem.
    ///
    /// Suitable for readers; writers should prefer [`SeriesStore::open`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            series_path: dir.join(SERIES_FILE),
            plain_log_path: Some(dir.join(PLAIN_LOG_FILE)),
            dir,
            append_state: Mutex::new(AppendState::default()),
        }
    }

    /// Creates the store directory if needed and repairs a torn tail.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        fs::create_dir_all(&store.dir)?;
        store.repair()?;
        info!(path = %store.series_path.display(), "series store opened");
        Ok(store)
    }

    /// Enables or disables the plain-text mirror
    pub fn with_plain_log(mut self, enabled: bool) -> Self {
        self.plain_log_path = enabled.then(|| self.dir.join(PLAIN_LOG_FILE));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn series_path(&self) -> &Path {
        &self.series_path
    }

    pub fn plain_log_path(&self) -> Option<&Path> {
        self.plain_log_path.as_deref()
    }

    /// Full series, or an empty one when the log is missing, unreadable or malformed.
    pub fn load(&self) -> Series {
        self.load_checked().unwrap_or_else(|e| {
            warn!(error = %e, path = %self.series_path.display(), "series store unreadable, treating as empty");
            Series::new()
        })
    }

    /// Full series. A missing log is an empty series; anything else that prevents a
    /// faithful read is an error.
    pub fn load_checked(&self) -> Result<Series> {
        let bytes = match fs::read(&self.series_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Series::new()),
            Err(e) => return Err(e.into()),
        };

        let complete = complete_len(&bytes);
        if complete < bytes.len() {
            debug!(bytes = bytes.len() - complete, "ignoring torn record at end of log");
        }

        let mut series = Series::new();
        for (idx, line) in bytes[..complete].split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record: MetricRecord = serde_json::from_slice(line)
                .map_err(|e| Error::corrupt_store(&self.series_path, idx + 1, e.to_string()))?;
            series.push(record);
        }

        Ok(series)
    }

    /// Durably appends one record.
    ///
    /// On success the record is the last entry seen by any later load.
    ///
    /// A record with a non-finite value is rejected with [`Error::InvalidRecord`] before
    /// anything is written.
    pub fn append(&self, record: &MetricRecord) -> Result<()> {
        record.validate()?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut state = self.append_state.lock();
        if !state.repaired {
            fs::create_dir_all(&self.dir)?;
            truncate_torn_tail(&self.series_path)?;
            self.repair_plain_log();
            state.repaired = true;
        }

        if let Err(e) = write_line(&self.series_path, &line) {
            // The write may have left a fragment behind.
            state.repaired = false;
            return Err(e.into());
        }

        if let Some(path) = &self.plain_log_path {
            if let Err(e) = append_plain_line(path, record) {
                warn!(error = %e, path = %path.display(), "plain-text log not updated");
            }
        }

        debug!(timestamp = %record.timestamp, "record appended");
        Ok(())
    }

    /// Truncates a torn trailing record, returning the number of bytes dropped from the
    /// structured log. The plain-text mirror is cut back to its last complete line too.
    pub fn repair(&self) -> Result<u64> {
        let mut state = self.append_state.lock();
        let dropped = truncate_torn_tail(&self.series_path)?;
        self.repair_plain_log();
        state.repaired = true;
        Ok(dropped)
    }

    fn repair_plain_log(&self) {
        if let Some(path) = &self.plain_log_path {
            if let Err(e) = truncate_torn_tail(path) {
                warn!(error = %e, path = %path.display(), "plain-text log not repaired");
            }
        }
    }

    /// Writes the full series to `dest` as a pretty-printed JSON array.
    ///
    /// The snapshot is written next to `dest` and renamed into place, so readers of `dest`
    /// see either the previous snapshot or the new one. Returns the number of records.
    pub fn export_snapshot(&self, dest: impl AsRef<Path>) -> Result<usize> {
        let dest = dest.as_ref();
        let series = self.load_checked()?;

        let mut tmp = dest.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, &series)?;
        writer.write_all(b"\n")?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp, dest)?;

        info!(records = series.len(), dest = %dest.display(), "snapshot exported");
        Ok(series.len())
    }
}

/// Length of the prefix that ends on a line boundary
fn complete_len(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|b| *b == b'\n').map_or(0, |pos| pos + 1)
}

fn truncate_torn_tail(path: &Path) -> Result<u64> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let keep = complete_len(&bytes);
    let dropped = (bytes.len() - keep) as u64;
    if dropped > 0 {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(keep as u64)?;
        file.sync_all()?;
        warn!(path = %path.display(), bytes = dropped, "truncated torn record");
    }

    Ok(dropped)
}

fn write_line(path: &Path, line: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line)?;
    file.sync_data()
}

fn append_plain_line(path: &Path, record: &MetricRecord) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut text = String::new();
    if file.metadata()?.len() == 0 {
        text.push_str(CSV_HEADER);
        text.push('\n');
    }
    text.push_str(&record.to_csv_line());
    text.push('\n');

    file.write_all(text.as_bytes())
}
