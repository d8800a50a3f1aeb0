//! # Reporter Module
//!
//! Writes scan output to disk and reads hash lists back.
//!
//! ## Files
//! | Prefix | Contents |
//! |--------|----------|
//! | `photo_hashes` | flat JSON array of [`PhotoRecord`](crate::core::hasher::PhotoRecord) |
//! | `photo_duplicates` | a [`ScanReport`](crate::core::classifier::ScanReport) |
//!
//! Every file is named `<prefix>_<YYYYmmdd_HHMMSS>.json` so repeated runs never
//! overwrite each other.

mod export;

pub use export::{read_records, timestamped_file_name, write_json};

/// File prefix for hash lists
pub const HASHES_PREFIX: &str = "photo_hashes";

/// File prefix for duplicate reports
pub const DUPLICATES_PREFIX: &str = "photo_duplicates";
