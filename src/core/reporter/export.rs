//! JSON export for hash lists and duplicate reports.

use crate::core::hasher::PhotoRecord;
use crate::error::{DupePixError, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `<prefix>_<YYYYmmdd_HHMMSS>.json` for the given moment
pub fn timestamped_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.json", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Write `value` as pretty-printed JSON to a new timestamped file in `dir`.
///
/// Creates `dir` if needed. Returns the path that was written.
pub fn write_json<T: Serialize + ?Sized>(value: &T, dir: &Path, prefix: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| DupePixError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(timestamped_file_name(prefix, Local::now()));
    let io_error = |source| DupePixError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        DupePixError::Serialization {
            path: path.clone(),
            source,
        }
    })?;
    writer.flush().map_err(io_error)?;

    info!("Saved {}", path.display());
    Ok(path)
}

/// Load a hash list written by [`write_json`] (or by older tools using a `hash` key).
///
/// Entries missing a field are logged and left out; only a file that is not a
/// JSON array at all is an error.
pub fn read_records(path: &Path) -> Result<Vec<PhotoRecord>> {
    let file = File::open(path).map_err(|source| DupePixError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            DupePixError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;

    let total = entries.len();
    let records: Vec<PhotoRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping entry {} in {}: {}", index, path.display(), e);
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            "{} of {} entries in {} were malformed",
            total - records.len(),
            total,
            path.display()
        );
    }
    Ok(records)
}
