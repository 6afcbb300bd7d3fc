//! Error taxonomy for the veto simulations
//!
//! A parameter that cannot describe a valid experiment, a file that cannot be
//! read or written, and a figure that could not be drawn. All are fatal for
//! the invoking command.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by configuration, sampling and figure output
#[derive(Debug, Error)]
pub enum VetoError {
    /// Bad sample size, distribution parameter, geometry or render option
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A file could not be read or written
    #[error("cannot access {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// Drawing failed for a reason other than file access (fonts, layout)
    #[error("cannot render figure {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },
}

impl VetoError {
    /// Build an `InvalidParameter` from anything printable
    pub fn invalid(msg: impl Into<String>) -> Self {
        VetoError::InvalidParameter(msg.into())
    }

    /// Build an `Io` error for `path`
    pub fn io(path: &Path, reason: impl ToString) -> Self {
        VetoError::Io {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Render` error for the figure at `path`
    pub fn render(path: &Path, reason: impl ToString) -> Self {
        VetoError::Render {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, VetoError>;
