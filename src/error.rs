// One error type for the whole tool.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Asking the OS for screen pixels failed
    #[error("Screen capture error: {0}")]
    Capture(String),

    /// Reading or writing the settings file failed
    #[error("Config error ({path}): {reason}")]
    Config { path: PathBuf, reason: String },

    /// The export directory is missing and could not be created
    #[error("Export path {path} could not be created: {source}")]
    ExportDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user declined to overwrite an existing export
    #[error("Export cancelled: {0} already holds an export")]
    ExportCancelled(PathBuf),

    /// Removing an old frame before re-exporting failed
    #[error("Could not remove old frame {path}: {source}")]
    ExportPurge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing one PNG failed; frames before it stay on disk
    #[error("Could not write {path}: {source}")]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Capture("no monitor".to_string());
        assert_eq!(err.to_string(), "Screen capture error: no monitor");
    }

    #[test]
    fn test_cancel_names_directory() {
        let err = Error::ExportCancelled(PathBuf::from("out"));
        assert!(err.to_string().contains("out"));
    }
}
