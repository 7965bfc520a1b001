use thiserror::Error;
use windows::core::Error as WinError;

/// Errors from the Win32 integration outside the `WinOps` surface.
#[derive(Error, Debug)]
pub enum Error {
    /// A Win32 call failed.
    #[error("{op} failed: {source}")]
    Win32 {
        /// Name of the failing call.
        op: &'static str,
        /// Underlying OS error.
        source: WinError,
    },

    /// The mouse hook could not be installed.
    #[error("failed to install mouse hook (try running as administrator): {0}")]
    Hook(WinError),

    /// The selection loop ended before enough windows were chosen.
    #[error("only {got}/{wanted} windows selected")]
    IncompleteSelection {
        /// Windows chosen.
        got: usize,
        /// Windows requested.
        wanted: usize,
    },
}

impl Error {
    /// Wrap a failed Win32 call.
    pub fn win32(op: &'static str, source: WinError) -> Self {
        Self::Win32 { op, source }
    }
}

/// Result alias for win-winops operations.
pub type Result<T> = std::result::Result<T, Error>;
