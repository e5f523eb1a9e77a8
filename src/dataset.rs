use image::ImageReader;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::MatcherConfig;
use crate::error::{ImageDecodeError, LabelError, ScanError, SkipReason};
use crate::labels::{load_annotations, MalformedPolicy};
use crate::types::{ImageRecord, ScanReport};
use crate::utils::{create_progress_bar, extension_lowercase, file_stem_string, list_files};

/// Records of one scan, sorted by key, plus what was left out.
#[derive(Debug)]
pub struct ScanOutcome {
    pub records: Vec<ImageRecord>,
    pub report: ScanReport,
}

// An image whose label file exists, waiting to be decoded
struct Candidate {
    key: String,
    image_path: PathBuf,
    label_path: PathBuf,
}

enum EntryOutcome {
    Matched {
        record: ImageRecord,
        skipped_lines: Vec<LabelError>,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
}

/// Read an image far enough to know its pixel size.
pub fn decode_dimensions(path: &Path) -> Result<(u32, u32), ImageDecodeError> {
    let decode_error = |source| ImageDecodeError {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;
    Ok((image.width(), image.height()))
}

/// Pair every recognized image with its label file and compute its angles.
///
/// Only an unreadable image or label directory fails the scan. Anything
/// wrong with a single entry is logged, counted in the report, and skipped.
pub fn scan_dataset(config: &MatcherConfig) -> Result<ScanOutcome, ScanError> {
    info!(
        "Scanning images in {} and labels in {}",
        config.image_dir.display(),
        config.label_dir.display()
    );

    let image_files = list_files(&config.image_dir)?;
    let label_files = list_files(&config.label_dir)?;

    let mut report = ScanReport::new();
    let candidates = collect_candidates(config, &image_files, &label_files, &mut report);

    let pb = if config.show_progress {
        create_progress_bar(candidates.len() as u64, "Images")
    } else {
        ProgressBar::hidden()
    };

    let process = |candidate: &Candidate| {
        let outcome = process_candidate(candidate, config.malformed_policy);
        pb.inc(1);
        outcome
    };
    let outcomes: Vec<EntryOutcome> = if config.parallel {
        candidates.par_iter().map(process).collect()
    } else {
        candidates.iter().map(process).collect()
    };
    pb.finish_and_clear();

    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            EntryOutcome::Matched {
                record,
                skipped_lines,
            } => {
                for line_error in skipped_lines {
                    warn!("Skipped label line: {}", line_error);
                    report.record_skipped_line(line_error);
                }
                report.increment_matched();
                records.push(record);
            }
            EntryOutcome::Skipped { path, reason } => {
                warn!("Skipping {}: {}", path.display(), reason);
                report.record_skip(&path, reason);
            }
        }
    }
    records.sort_by(|a, b| a.key.cmp(&b.key));

    report.print_summary();
    Ok(ScanOutcome { records, report })
}

/// Filter images by extension, derive label paths, and drop entries
/// that cannot form a pair.
fn collect_candidates(
    config: &MatcherConfig,
    image_files: &[PathBuf],
    label_files: &[PathBuf],
    report: &mut ScanReport,
) -> Vec<Candidate> {
    let label_set: HashSet<&Path> = label_files.iter().map(PathBuf::as_path).collect();
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut candidates = Vec::new();

    for image_path in image_files {
        let recognized =
            extension_lowercase(image_path).is_some_and(|ext| config.is_image_extension(&ext));
        if !recognized {
            continue;
        }
        report.images_found += 1;
        let Some(key) = file_stem_string(image_path) else {
            warn!("Skipping image with a non UTF-8 name: {}", image_path.display());
            report.record_skip(image_path, SkipReason::InvalidName);
            continue;
        };

        if let Some(first) = seen.get(&key) {
            report.record_skip(
                image_path,
                SkipReason::DuplicateKey {
                    key,
                    first: first.clone(),
                },
            );
            continue;
        }
        seen.insert(key.clone(), image_path.clone());

        let label_path = config
            .label_dir
            .join(format!("{}.{}", key, config.label_extension));
        if !label_set.contains(label_path.as_path()) {
            debug!("No label file for {}", image_path.display());
            report.increment_missing_label();
            continue;
        }

        candidates.push(Candidate {
            key,
            image_path: image_path.clone(),
            label_path,
        });
    }

    let label_extension = config.label_extension.to_lowercase();
    report.orphan_labels = label_files
        .iter()
        .filter(|path| extension_lowercase(path).as_deref() == Some(label_extension.as_str()))
        .filter_map(|path| file_stem_string(path))
        .filter(|stem| !seen.contains_key(stem))
        .count();

    candidates
}

fn process_candidate(candidate: &Candidate, policy: MalformedPolicy) -> EntryOutcome {
    let dimensions = match decode_dimensions(&candidate.image_path) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            return EntryOutcome::Skipped {
                path: candidate.image_path.clone(),
                reason: e.into(),
            }
        }
    };

    let loaded = match load_annotations(&candidate.label_path, policy) {
        Ok(loaded) => loaded,
        Err(e) => {
            return EntryOutcome::Skipped {
                path: candidate.label_path.clone(),
                reason: e.into(),
            }
        }
    };

    debug!(
        "{}: {}x{}, {} annotations",
        candidate.key,
        dimensions.0,
        dimensions.1,
        loaded.annotations.len()
    );

    EntryOutcome::Matched {
        record: ImageRecord::new(
            candidate.key.clone(),
            candidate.image_path.clone(),
            candidate.label_path.clone(),
            dimensions,
            loaded.annotations,
        ),
        skipped_lines: loaded.skipped,
    }
}
