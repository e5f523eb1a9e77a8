use clap::ValueEnum;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::LabelError;
use crate::types::PointAnnotation;

/// What to do with a label file that contains a malformed line.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum MalformedPolicy {
    /// Reject the whole file
    #[default]
    SkipFile,
    /// Drop only the bad lines and keep the rest
    SkipLine,
}

/// How many detections per image end up in a written label file.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DetectionPolicy {
    /// Only the first (highest-confidence) detection
    FirstOnly,
    /// Every detection, in the given order
    #[default]
    All,
}

/// Annotations read from one label file.
#[derive(Debug, Default)]
pub struct LoadedLabels {
    pub annotations: Vec<PointAnnotation>,
    /// Lines dropped under [`MalformedPolicy::SkipLine`].
    pub skipped: Vec<LabelError>,
}

/// Parse one `class x_center y_center width height` line.
///
/// Extra trailing fields are ignored. Line numbers are 1-based. The center
/// must lie in [0, 1]; the box extent only has to be a finite number.
pub fn parse_label_line(
    text: &str,
    line: usize,
    path: &Path,
) -> Result<PointAnnotation, LabelError> {
    let malformed = |reason: String| LabelError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(malformed(format!(
            "expected 5 fields (class x y w h), found {}",
            fields.len()
        )));
    }

    let class_id = fields[0]
        .parse::<u32>()
        .map_err(|_| malformed(format!("invalid class id '{}'", fields[0])))?;

    let mut values = [0.0f64; 4];
    for (value, (name, field)) in values
        .iter_mut()
        .zip(["x_center", "y_center", "width", "height"].iter().zip(&fields[1..5]))
    {
        let parsed = field
            .parse::<f64>()
            .map_err(|_| malformed(format!("invalid {} '{}'", name, field)))?;
        if !parsed.is_finite() {
            return Err(malformed(format!("{} '{}' is not finite", name, field)));
        }
        let is_center = name.ends_with("_center");
        if is_center && !(0.0..=1.0).contains(&parsed) {
            return Err(malformed(format!(
                "{} {} is outside the normalized range [0, 1]",
                name, parsed
            )));
        }
        *value = parsed;
    }

    let [x, y, w, h] = values;
    Ok(PointAnnotation::new(class_id, x, y).with_extent(w, h))
}

/// Read every annotation of a label file, in line order.
///
/// Blank lines are ignored; an empty file yields no annotations.
pub fn load_annotations(path: &Path, policy: MalformedPolicy) -> Result<LoadedLabels, LabelError> {
    let file = File::open(path).map_err(|e| LabelError::from_io(path.to_path_buf(), e))?;
    let reader = BufReader::new(file);

    let mut loaded = LoadedLabels::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LabelError::from_io(path.to_path_buf(), e))?;
        // Editors on Windows may prefix the file with a byte order mark
        let text = if index == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line.as_str()
        };
        if text.trim().is_empty() {
            continue;
        }
        match parse_label_line(text, index + 1, path) {
            Ok(annotation) => loaded.annotations.push(annotation),
            Err(e) if policy == MalformedPolicy::SkipLine => {
                debug!("Dropping line: {}", e);
                loaded.skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(loaded)
}

/// Format annotations as YOLO label text.
pub fn format_annotations(annotations: &[PointAnnotation]) -> String {
    let mut yolo_data = String::with_capacity(annotations.len() * 48);
    for a in annotations {
        yolo_data.push_str(&format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            a.class_id, a.x_norm, a.y_norm, a.width_norm, a.height_norm
        ));
    }
    yolo_data
}

/// Write a label file for one image.
///
/// Returns `false` without touching the filesystem when the policy keeps
/// nothing to write (no detections under [`DetectionPolicy::FirstOnly`]).
pub fn write_annotations(
    path: &Path,
    annotations: &[PointAnnotation],
    policy: DetectionPolicy,
) -> std::io::Result<bool> {
    let kept = match policy {
        DetectionPolicy::FirstOnly if annotations.is_empty() => return Ok(false),
        DetectionPolicy::FirstOnly => &annotations[..1],
        DetectionPolicy::All => annotations,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_annotations(kept).as_bytes())?;
    writer.flush()?;
    Ok(true)
}
