use std::path::PathBuf;

/// Errors raised while reading a YOLO label file.
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    #[error("label file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read label file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed annotation in {} at line {line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl LabelError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LabelError::NotFound { path }
        } else {
            LabelError::Io { path, source }
        }
    }
}

/// An image that exists but could not be opened or decoded.
#[derive(thiserror::Error, Debug)]
#[error("failed to decode image {}: {source}", path.display())]
pub struct ImageDecodeError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Fatal scan failures. Per-file problems never surface here.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("cannot read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("no record with key '{key}' in catalog")]
pub struct KeyNotFound {
    pub key: String,
}

/// Why a single dataset entry was left out of the catalog.
#[derive(thiserror::Error, Debug)]
pub enum SkipReason {
    #[error(transparent)]
    Decode(#[from] ImageDecodeError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error("file name is not valid UTF-8")]
    InvalidName,
    #[error("duplicate record key '{key}' (already provided by {})", first.display())]
    DuplicateKey { key: String, first: PathBuf },
}
