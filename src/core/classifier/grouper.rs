//! Groups records by digest and picks an original per group.

use super::{DuplicateRecord, ScanReport, ScanSummary};
use crate::core::hasher::PhotoRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Records bucketed by digest.
///
/// Buckets keep the order in which their digest was first seen, and records keep
/// insertion order inside a bucket, so the same input always groups the same way.
#[derive(Debug, Default)]
pub struct DigestGroups {
    index: HashMap<String, usize>,
    groups: Vec<Vec<PhotoRecord>>,
}

impl DigestGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PhotoRecord) {
        match self.index.get(&record.digest) {
            Some(&slot) => self.groups[slot].push(record),
            None => {
                self.index.insert(record.digest.clone(), self.groups.len());
                self.groups.push(vec![record]);
            }
        }
    }

    /// Number of distinct digests
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<Vec<PhotoRecord>> {
        self.groups
    }
}

impl FromIterator<PhotoRecord> for DigestGroups {
    fn from_iter<I: IntoIterator<Item = PhotoRecord>>(iter: I) -> Self {
        let mut groups = DigestGroups::new();
        for record in iter {
            groups.push(record);
        }
        groups
    }
}

/// Classify records, stamping the report with the current time
pub fn classify<I>(records: I) -> ScanReport
where
    I: IntoIterator<Item = PhotoRecord>,
{
    classify_at(records, Utc::now())
}

/// Classify records with an explicit completion timestamp
pub fn classify_at<I>(records: I, timestamp: DateTime<Utc>) -> ScanReport
where
    I: IntoIterator<Item = PhotoRecord>,
{
    let groups: DigestGroups = records.into_iter().collect();
    let unique_content_count = groups.len();

    let mut total_files_processed = 0;
    let mut total_storage_consumed_bytes = 0u64;
    let mut reclaimable_bytes = 0u64;
    let mut duplicates = Vec::new();

    for mut group in groups.into_groups() {
        total_files_processed += group.len();
        if group.len() < 2 {
            continue;
        }

        // Plain string order, not component order: "a b" sorts before "a/b"
        group.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
        total_storage_consumed_bytes += group.iter().map(|r| r.size).sum::<u64>();

        let mut members = group.into_iter();
        let Some(original) = members.next() else {
            continue;
        };

        for record in members {
            reclaimable_bytes += record.size;
            duplicates.push(DuplicateRecord {
                record,
                original_path: original.path.clone(),
            });
        }
    }

    ScanReport {
        summary: ScanSummary {
            timestamp,
            total_files_processed,
            unique_content_count,
            duplicate_count: duplicates.len(),
            total_storage_consumed_bytes,
            reclaimable_bytes,
        },
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn record(path: &str, digest: &str, size: u64) -> PhotoRecord {
        PhotoRecord::new(path, digest, size)
    }

    fn assert_counts_consistent(report: &ScanReport) {
        let s = &report.summary;
        assert_eq!(
            s.duplicate_count,
            s.total_files_processed - s.unique_content_count
        );
        assert_eq!(s.duplicate_count, report.duplicates.len());
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = classify(Vec::new());

        assert_eq!(report.summary.total_files_processed, 0);
        assert_eq!(report.summary.unique_content_count, 0);
        assert_eq!(report.summary.duplicate_count, 0);
        assert_eq!(report.summary.total_storage_consumed_bytes, 0);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn hash_list_with_three_groups() {
        let report = classify(vec![
            record("path1", "hash_abc", 100),
            record("path2", "hash_xyz", 200),
            record("path3", "hash_abc", 100),
            record("path4", "hash_def", 300),
            record("path5", "hash_def", 300),
            record("path6", "hash_def", 300),
        ]);

        assert_counts_consistent(&report);
        assert_eq!(report.summary.total_files_processed, 6);
        assert_eq!(report.summary.unique_content_count, 3);
        assert_eq!(report.summary.duplicate_count, 3);
        // Both groups in full, the singleton excluded
        assert_eq!(report.summary.total_storage_consumed_bytes, 100 * 2 + 300 * 3);
        assert_eq!(report.summary.reclaimable_bytes, 100 + 300 * 2);

        assert_eq!(report.duplicates[0].record.path, PathBuf::from("path3"));
        assert_eq!(report.duplicates[0].original_path, PathBuf::from("path1"));
        assert!(report.duplicates[1..]
            .iter()
            .all(|d| d.original_path == Path::new("path4")));
    }

    #[test]
    fn original_is_smallest_path_not_first_seen() {
        let report = classify(vec![
            record("photos/zebra.jpg", "h", 1),
            record("photos/apple.jpg", "h", 1),
            record("photos/mango.jpg", "h", 1),
        ]);

        assert_eq!(report.duplicates.len(), 2);
        for duplicate in &report.duplicates {
            assert_eq!(duplicate.original_path, Path::new("photos/apple.jpg"));
        }
        assert_eq!(report.duplicates[0].record.path, Path::new("photos/mango.jpg"));
        assert_eq!(report.duplicates[1].record.path, Path::new("photos/zebra.jpg"));
    }

    #[test]
    fn original_uses_string_order_across_separators() {
        let report = classify(vec![
            record("photos/2020/img.jpg", "h", 1),
            record("photos/2020 copy.jpg", "h", 1),
            record("photos/2020-old.jpg", "h", 1),
        ]);

        // ' ' < '-' < '/'
        assert_eq!(report.duplicates.len(), 2);
        for duplicate in &report.duplicates {
            assert_eq!(duplicate.original_path, Path::new("photos/2020 copy.jpg"));
        }
        assert_eq!(report.duplicates[0].record.path, Path::new("photos/2020-old.jpg"));
        assert_eq!(report.duplicates[1].record.path, Path::new("photos/2020/img.jpg"));
    }

    #[test]
    fn singletons_are_unique_but_cost_nothing() {
        let report = classify(vec![
            record("a.jpg", "h1", 10),
            record("b.jpg", "h2", 20),
            record("c.jpg", "h3", 30),
        ]);

        assert_counts_consistent(&report);
        assert_eq!(report.summary.unique_content_count, 3);
        assert_eq!(report.summary.duplicate_count, 0);
        assert_eq!(report.summary.total_storage_consumed_bytes, 0);
        assert_eq!(report.summary.reclaimable_bytes, 0);
    }

    #[test]
    fn same_input_gives_same_report() {
        let records = vec![
            record("d/2.jpg", "x", 4),
            record("d/1.jpg", "y", 4),
            record("d/3.jpg", "x", 4),
            record("d/4.jpg", "y", 4),
        ];
        let at = Utc::now();

        let first = classify_at(records.clone(), at);
        let second = classify_at(records, at);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn digest_groups_preserve_first_seen_order() {
        let groups: DigestGroups = vec![
            record("a", "second", 1),
            record("b", "first", 1),
            record("c", "second", 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(groups.len(), 2);
        let groups = groups.into_groups();
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][1].path, PathBuf::from("c"));
        assert_eq!(groups[1][0].digest, "first");
    }
}
