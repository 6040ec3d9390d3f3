use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnembedError {
    #[error("Input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

/// Failure of a single embedded image. Never aborts a scan.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for UnembedError {
    fn user_message(&self) -> String {
        match self {
            UnembedError::InputNotFound { path } => {
                format!("File '{}' not found", path.display())
            }
            UnembedError::Read { path, source } => {
                format!("Could not read '{}': {}", path.display(), source)
            }
            UnembedError::Write { path, source } => {
                format!("Could not write '{}': {}", path.display(), source)
            }
            UnembedError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            UnembedError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            UnembedError::InputNotFound { .. } => Some(
                "Check the path of the HTML file. Relative paths are resolved from the current directory.".to_string()
            ),
            UnembedError::Read { .. } => Some(
                "Ensure the input file is readable and is not a directory.".to_string()
            ),
            UnembedError::Write { .. } => Some(
                "Ensure you have write permission for the output location, or pass a different output file.".to_string()
            ),
            UnembedError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            UnembedError::InvalidPath { .. } => Some(
                "Use a relative image directory such as 'images' or 'assets/img'.".to_string()
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnembedError>;
