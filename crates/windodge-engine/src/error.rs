use std::path::PathBuf;

use thiserror::Error;

use crate::WindowId;

/// Errors produced by the dodge engine and its window-manager collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A corner digit outside `1..=4` was supplied.
    #[error("invalid position '{0}': must be 1, 2, 3, or 4")]
    InvalidCorner(char),

    /// The allowed corner set ended up empty.
    #[error("no valid positions specified")]
    EmptyCornerSet,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read config {}: {message}", path.display())]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },

    /// The configuration file is not valid RON.
    #[error("failed to parse config {}: {message}", path.display())]
    ConfigParse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parser message, including the location.
        message: String,
    },

    /// The window handle is no longer valid (window closed).
    #[error("window {0} is gone")]
    WindowGone(WindowId),

    /// Geometry for the window could not be read, even after retries.
    #[error("geometry unavailable for window {0}")]
    GeometryUnavailable(WindowId),

    /// The window manager does not support the requested query.
    #[error("unsupported window-manager capability: {0}")]
    Unsupported(&'static str),

    /// An OS call failed.
    #[error("{op} failed: {message}")]
    Os {
        /// Name of the failing OS operation.
        op: &'static str,
        /// OS-provided error message.
        message: String,
    },

    /// None of the selected windows could be brought under control.
    #[error("no valid windows to control")]
    NoWindows,
}

impl Error {
    /// Build an OS error for `op` from any displayable message.
    pub fn os(op: &'static str, message: impl ToString) -> Self {
        Self::Os {
            op,
            message: message.to_string(),
        }
    }

    /// True for per-window failures the poll loop logs and rides out.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::WindowGone(_) | Self::GeometryUnavailable(_) | Self::Os { .. }
        )
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
