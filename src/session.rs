//! Read-only catalog of matched records handed to the presentation layer.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::MatcherConfig;
use crate::dataset::scan_dataset;
use crate::error::{KeyNotFound, ScanError};
use crate::types::{ImageRecord, ScanReport};

/// What the presentation layer needs to show one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub key: String,
    pub image_path: String,
    pub angles: Vec<String>,
}

impl RecordView {
    pub fn degrees_text(&self) -> String {
        format!("Degrees of Notches: {}", self.angles.join(", "))
    }
}

impl From<&ImageRecord> for RecordView {
    fn from(record: &ImageRecord) -> Self {
        Self {
            key: record.key.clone(),
            image_path: record.image_path.to_string_lossy().into_owned(),
            angles: record.angle_strings(),
        }
    }
}

/// Catalog built from a single scan. Re-scanning means building a new
/// session.
#[derive(Debug)]
pub struct ReviewSession {
    catalog: BTreeMap<String, ImageRecord>,
    report: ScanReport,
}

impl ReviewSession {
    /// Scan the configured directories and hold the result.
    pub fn open(config: &MatcherConfig) -> Result<Self, ScanError> {
        let outcome = scan_dataset(config)?;
        Ok(Self::from_records(outcome.records, outcome.report))
    }

    /// Later records with an already-present key are ignored.
    pub fn from_records(records: Vec<ImageRecord>, report: ScanReport) -> Self {
        let mut catalog = BTreeMap::new();
        for record in records {
            catalog.entry(record.key.clone()).or_insert(record);
        }
        Self { catalog, report }
    }

    pub fn list_keys(&self) -> Vec<&str> {
        self.catalog.keys().map(String::as_str).collect()
    }

    pub fn get(&self, key: &str) -> Result<&ImageRecord, KeyNotFound> {
        self.catalog.get(key).ok_or_else(|| KeyNotFound {
            key: key.to_string(),
        })
    }

    pub fn view(&self, key: &str) -> Result<RecordView, KeyNotFound> {
        self.get(key).map(RecordView::from)
    }

    /// Look a record up by its image path, e.g. from a file picker.
    pub fn find_by_image(&self, image_path: &Path) -> Option<&ImageRecord> {
        self.catalog
            .values()
            .find(|record| record.image_path == image_path)
    }

    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointAnnotation;
    use std::path::PathBuf;

    fn record(key: &str, points: &[(f64, f64)]) -> ImageRecord {
        ImageRecord::new(
            key.to_string(),
            PathBuf::from(format!("images/{}.png", key)),
            PathBuf::from(format!("labels/{}.txt", key)),
            (640, 640),
            points
                .iter()
                .map(|&(x, y)| PointAnnotation::new(0, x, y))
                .collect(),
        )
    }

    fn session() -> ReviewSession {
        ReviewSession::from_records(
            vec![
                record("b", &[(0.5, 1.0)]),
                record("a", &[(0.5, 0.0), (1.0, 0.5)]),
            ],
            ScanReport::new(),
        )
    }

    #[test]
    fn test_list_keys_sorted() {
        assert_eq!(session().list_keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_get_and_view() {
        let session = session();
        let record = session.get("a").unwrap();
        assert_eq!(record.angles_degrees.len(), record.annotations.len());

        let view = session.view("a").unwrap();
        assert_eq!(view.image_path, PathBuf::from("images/a.png").to_string_lossy());
        assert_eq!(view.angles, vec!["0.000", "90.000"]);
        assert_eq!(view.degrees_text(), "Degrees of Notches: 0.000, 90.000");
        assert_eq!(record.list_label(), "File: a.png, Degrees of Notches: 0.000, 90.000");
    }

    #[test]
    fn test_unknown_key() {
        let session = session();
        assert_eq!(
            session.get("zzz").unwrap_err(),
            KeyNotFound {
                key: "zzz".to_string()
            }
        );
        assert!(session.view("zzz").is_err());
    }

    #[test]
    fn test_every_listed_key_resolves() {
        let session = session();
        let labels: Vec<String> = session
            .list_keys()
            .into_iter()
            .map(|key| session.get(key).unwrap().list_label())
            .collect();
        assert_eq!(
            labels,
            vec![
                "File: a.png, Degrees of Notches: 0.000, 90.000",
                "File: b.png, Degrees of Notches: 180.000",
            ]
        );
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_find_by_image() {
        let session = session();
        let found = session.find_by_image(Path::new("images/b.png")).unwrap();
        assert_eq!(found.key, "b");
        assert!(session.find_by_image(Path::new("images/c.png")).is_none());
    }

    #[test]
    fn test_view_serializes_angles_as_strings() {
        let view = session().view("b").unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["angles"][0], "180.000");
        assert_eq!(json["key"], "b");
    }
}
