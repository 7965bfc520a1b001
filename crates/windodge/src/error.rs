//! Error handling for the windodge binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for the binary.
pub type Result<T> = result::Result<T, Error>;

/// Errors that end the program.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Configuration, initialization, or dodge-loop failure.
    #[error("{0}")]
    Engine(#[from] windodge_engine::Error),
    /// Win32 setup or selection failure.
    #[cfg(windows)]
    #[error("{0}")]
    Platform(#[from] win_winops::Error),
    /// Built for an OS without a window-manager backend.
    #[cfg_attr(windows, allow(dead_code))]
    #[error("windodge only runs on Windows (this is {0})")]
    UnsupportedPlatform(&'static str),
}
