use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// List the regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let unreadable = |source| ScanError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        // Follow symlinks so linked images still count
        if fs::metadata(entry.path()).is_ok_and(|m| m.is_file()) {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// File stem as an owned string, if it is valid UTF-8.
pub fn file_stem_string(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Lowercase extension, if any.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_sorted_and_skips_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.txt"] {
            fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(temp_dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_files(temp_dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.txt"]);
    }

    #[test]
    fn test_list_files_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = list_files(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(ScanError::DirectoryUnreadable { .. })));
    }

    #[test]
    fn test_stem_and_extension() {
        let path = Path::new("dir/img.v2.PNG");
        assert_eq!(file_stem_string(path).as_deref(), Some("img.v2"));
        assert_eq!(extension_lowercase(path).as_deref(), Some("png"));
        assert_eq!(extension_lowercase(Path::new("README")), None);
    }
}
