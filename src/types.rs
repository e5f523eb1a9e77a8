use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::angle::Degrees;
use crate::error::{LabelError, SkipReason};

// Image formats the decoder is built with
pub const IMG_FORMATS: &[&str] = &["bmp", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

// Extension of YOLO label files
pub const LABEL_EXTENSION: &str = "txt";

/// One detected feature, normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointAnnotation {
    pub class_id: u32,
    pub x_norm: f64,
    pub y_norm: f64,
    pub width_norm: f64,
    pub height_norm: f64,
}

impl PointAnnotation {
    pub fn new(class_id: u32, x_norm: f64, y_norm: f64) -> Self {
        Self {
            class_id,
            x_norm,
            y_norm,
            width_norm: 0.0,
            height_norm: 0.0,
        }
    }

    pub fn with_extent(mut self, width_norm: f64, height_norm: f64) -> Self {
        self.width_norm = width_norm;
        self.height_norm = height_norm;
        self
    }
}

/// An image paired with its label file and the angle of every annotation.
///
/// `angles_degrees[i]` is always computed from `annotations[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub key: String,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub annotations: Vec<PointAnnotation>,
    pub angles_degrees: Vec<Degrees>,
}

impl ImageRecord {
    pub fn new(
        key: String,
        image_path: PathBuf,
        label_path: PathBuf,
        (width, height): (u32, u32),
        annotations: Vec<PointAnnotation>,
    ) -> Self {
        let angles_degrees = crate::angle::calculate_angles(&annotations, width, height);
        Self {
            key,
            image_path,
            label_path,
            width,
            height,
            annotations,
            angles_degrees,
        }
    }

    /// Canonical 3-decimal angle strings, in annotation order.
    pub fn angle_strings(&self) -> Vec<String> {
        self.angles_degrees.iter().map(|d| d.to_string()).collect()
    }

    /// List entry text, e.g. `File: a.png, Degrees of Notches: 90.000`.
    pub fn list_label(&self) -> String {
        let file_name = self
            .image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.key.clone());
        format!(
            "File: {}, Degrees of Notches: {}",
            file_name,
            self.angle_strings().join(", ")
        )
    }
}

/// A non-fatal problem met while scanning one entry.
#[derive(Debug)]
pub struct SkipDiagnostic {
    pub path: PathBuf,
    pub reason: SkipReason,
}

// Counters and diagnostics for one dataset scan
#[derive(Debug, Default)]
pub struct ScanReport {
    pub images_found: usize,
    pub matched: usize,
    pub missing_label: usize,
    pub orphan_labels: usize,
    pub decode_failures: usize,
    pub malformed_labels: usize,
    pub skipped_lines: usize,
    pub duplicate_keys: usize,
    pub invalid_names: usize,
    pub diagnostics: Vec<SkipDiagnostic>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_matched(&mut self) {
        self.matched += 1;
    }

    pub fn increment_missing_label(&mut self) {
        self.missing_label += 1;
    }

    /// Record an entry that was dropped from the catalog.
    pub fn record_skip(&mut self, path: &Path, reason: SkipReason) {
        match &reason {
            SkipReason::Decode(_) => self.decode_failures += 1,
            SkipReason::Label(_) => self.malformed_labels += 1,
            SkipReason::DuplicateKey { .. } => self.duplicate_keys += 1,
            SkipReason::InvalidName => self.invalid_names += 1,
        }
        self.diagnostics.push(SkipDiagnostic {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Record a single label line dropped under the line policy.
    pub fn record_skipped_line(&mut self, error: LabelError) {
        let path = match &error {
            LabelError::NotFound { path }
            | LabelError::Io { path, .. }
            | LabelError::Malformed { path, .. } => path.clone(),
        };
        self.skipped_lines += 1;
        self.diagnostics.push(SkipDiagnostic {
            path,
            reason: SkipReason::Label(error),
        });
    }

    /// Entries that had an image but did not make it into the catalog.
    pub fn total_skipped(&self) -> usize {
        self.missing_label
            + self.decode_failures
            + self.malformed_labels
            + self.duplicate_keys
            + self.invalid_names
    }

    pub fn print_summary(&self) {
        log::info!("=== Scan Summary ===");
        log::info!("Images found: {}", self.images_found);
        log::info!("Matched records: {}", self.matched);
        log::info!("Images without a label file: {}", self.missing_label);
        log::info!("Label files without an image: {}", self.orphan_labels);

        let failed = self.decode_failures
            + self.malformed_labels
            + self.duplicate_keys
            + self.invalid_names;
        if failed > 0 {
            log::warn!(
                "Skipped {} entries (undecodable image: {}, malformed label: {}, duplicate key: {}, invalid name: {})",
                failed,
                self.decode_failures,
                self.malformed_labels,
                self.duplicate_keys,
                self.invalid_names
            );
        }
        if self.skipped_lines > 0 {
            log::warn!("Dropped {} malformed label lines", self.skipped_lines);
        }
    }
}
