use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::labels::MalformedPolicy;
use crate::types::{IMG_FORMATS, LABEL_EXTENSION};

/// Compute notch angles from YOLO labels and list them per image.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing the images
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: String,

    /// Directory containing the YOLO label files
    #[arg(short = 'l', long = "label_dir")]
    pub label_dir: String,

    /// Image extensions to pick up from image_dir
    #[arg(
        long = "image_ext",
        use_value_delimiter = true,
        default_value = "png",
        value_parser = validate_image_extension
    )]
    pub image_ext: Vec<String>,

    /// Extension of the label files
    #[arg(
        long = "label_ext",
        default_value = LABEL_EXTENSION,
        value_parser = validate_label_extension
    )]
    pub label_ext: String,

    /// What to do with label files containing malformed lines
    #[arg(long = "malformed", value_enum, default_value = "skip-file")]
    pub malformed: MalformedPolicy,

    /// Decode images and compute angles on all cores
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Hide the progress bar
    #[arg(long = "no_progress")]
    pub no_progress: bool,

    /// Print a single record instead of the whole catalog
    #[arg(long = "show")]
    pub show: Option<String>,

    /// Output format: 'text' or 'json'
    #[arg(
        long = "output_format",
        visible_alias = "format",
        value_enum,
        default_value = "text"
    )]
    pub output_format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Inputs of a single dataset scan.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub image_dir: PathBuf,
    pub label_dir: PathBuf,
    /// Lowercase, without the leading dot.
    pub image_extensions: BTreeSet<String>,
    pub label_extension: String,
    pub malformed_policy: MalformedPolicy,
    pub parallel: bool,
    pub show_progress: bool,
}

impl MatcherConfig {
    pub fn new(image_dir: impl Into<PathBuf>, label_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            label_dir: label_dir.into(),
            image_extensions: BTreeSet::from(["png".to_string()]),
            label_extension: LABEL_EXTENSION.to_string(),
            malformed_policy: MalformedPolicy::default(),
            parallel: false,
            show_progress: false,
        }
    }

    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether a file extension belongs to the recognized image set.
    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions.contains(&ext.to_lowercase())
    }
}

impl Args {
    pub fn to_matcher_config(&self) -> MatcherConfig {
        let mut config = MatcherConfig::new(&self.image_dir, &self.label_dir)
            .with_image_extensions(&self.image_ext)
            .with_malformed_policy(self.malformed)
            .with_parallel(self.parallel);
        config.label_extension = self.label_ext.clone();
        config.show_progress = !self.no_progress;
        config
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

// Accept only extensions the image decoder is built for
pub fn validate_image_extension(s: &str) -> Result<String, String> {
    let ext = normalize_extension(s);
    if IMG_FORMATS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(format!(
            "unsupported image extension '{}' (expected one of: {})",
            s,
            IMG_FORMATS.join(", ")
        ))
    }
}

pub fn validate_label_extension(s: &str) -> Result<String, String> {
    let ext = s.trim().trim_start_matches('.');
    if ext.is_empty() || ext.contains(['/', '\\', '.']) {
        Err("LABEL_EXT must be a plain extension such as 'txt'".to_string())
    } else {
        Ok(ext.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_extension() {
        assert_eq!(validate_image_extension("png"), Ok("png".to_string()));
        assert_eq!(validate_image_extension(".JPG"), Ok("jpg".to_string()));
        assert!(validate_image_extension("gif").is_err());
        assert!(validate_image_extension("").is_err());
    }

    #[test]
    fn test_validate_label_extension() {
        assert_eq!(validate_label_extension(".txt"), Ok("txt".to_string()));
        assert!(validate_label_extension("").is_err());
        assert!(validate_label_extension("a/b").is_err());
    }

    #[test]
    fn test_args_to_matcher_config() {
        let args = Args::try_parse_from([
            "yolo2angle",
            "-i",
            "imgs",
            "-l",
            "labels",
            "--image_ext",
            "png,JPG",
            "--malformed",
            "skip-line",
            "--parallel",
        ])
        .unwrap();

        let config = args.to_matcher_config();
        assert_eq!(config.image_dir, PathBuf::from("imgs"));
        assert_eq!(config.label_dir, PathBuf::from("labels"));
        assert!(config.is_image_extension("PNG"));
        assert!(config.is_image_extension("jpg"));
        assert!(!config.is_image_extension("bmp"));
        assert_eq!(config.label_extension, "txt");
        assert_eq!(config.malformed_policy, MalformedPolicy::SkipLine);
        assert!(config.parallel);
        assert!(config.show_progress);
    }

    #[test]
    fn test_default_matcher_config_recognizes_png_only() {
        let config = MatcherConfig::new("a", "b");
        assert!(config.is_image_extension("png"));
        assert!(!config.is_image_extension("jpg"));
        assert_eq!(config.malformed_policy, MalformedPolicy::SkipFile);
    }
}
