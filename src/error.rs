use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up or loading the slideshow.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The path does not exist or is not a directory.
    #[error("invalid directory path: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// The directory holds no file with a supported image extension.
    #[error("no images found in directory: {}", .0.display())]
    NoImagesFound(PathBuf),

    /// Window or rendering context could not be created.
    #[error("display initialization failed: {0}")]
    DisplayInit(String),

    /// A single image failed to decode. Never fatal: the entry stays unusable.
    #[error("unable to load image {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
