//! YOLO label to notch angle converter
//!
//! This library pairs images with their YOLO label files, turns every
//! annotated point into an angle around the image center, and keeps the
//! results in a read-only catalog for browsing.

pub mod angle;
pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use angle::{calculate_angle, calculate_angles, Degrees};
pub use config::{Args, MatcherConfig, OutputFormat};
pub use dataset::{scan_dataset, ScanOutcome};
pub use error::{ImageDecodeError, KeyNotFound, LabelError, ScanError, SkipReason};
pub use labels::{load_annotations, write_annotations, DetectionPolicy, MalformedPolicy};
pub use session::{RecordView, ReviewSession};
pub use types::{ImageRecord, PointAnnotation, ScanReport};
