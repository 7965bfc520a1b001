//! The window-manager collaborator, abstracted for testability.

use std::fmt;

use crate::{
    Result, WindowId,
    geom::{Point, Rect, Size},
};

/// Z-order band applied by a positioning command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZBand {
    /// Keep the window above all non-topmost windows.
    TopMost,
    /// Drop the always-on-top flag.
    NotTopMost,
}

/// A single positioning request. Every variant avoids activating the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosCommand {
    /// Move and resize the bounding box, apply `band`, and show the window.
    Place {
        /// Bounding origin.
        origin: Point,
        /// Bounding size.
        size: Size,
        /// Z-order band to apply.
        band: ZBand,
    },
    /// Move only; size and z-order are left untouched. Used for animation frames.
    Frame {
        /// Bounding origin.
        origin: Point,
    },
    /// Change the z-order band only, without blocking on the target window.
    Band(ZBand),
}

/// Human-readable identity of a window, for logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowLabel {
    /// Window title, or `N/A`.
    pub title: String,
    /// Window class name, or `N/A`.
    pub class: String,
}

impl Default for WindowLabel {
    fn default() -> Self {
        Self {
            title: "N/A".into(),
            class: "N/A".into(),
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (class '{}')", self.title, self.class)
    }
}

/// Trait abstraction over window-manager operations.
pub trait WinOps: Send + Sync {
    /// Primary display size in physical pixels.
    fn screen_size(&self) -> Size;
    /// True while the handle refers to a live window.
    fn is_window(&self, id: WindowId) -> bool;
    /// True when the window is visible.
    fn is_visible(&self, id: WindowId) -> bool;
    /// True when the window is maximized.
    fn is_maximized(&self, id: WindowId) -> bool;
    /// Raw bounding rectangle, including any invisible frame.
    fn window_rect(&self, id: WindowId) -> Result<Rect>;
    /// Composited visual rectangle. Returns [`crate::Error::Unsupported`]
    /// when the capability is missing altogether.
    fn frame_bounds(&self, id: WindowId) -> Result<Rect>;
    /// Current cursor position, if it can be read.
    fn cursor_pos(&self) -> Option<Point>;
    /// Apply a positioning command.
    fn apply(&self, id: WindowId, cmd: PosCommand) -> Result<()>;
    /// Title and class, for logs.
    fn label(&self, id: WindowId) -> WindowLabel {
        let _ = id;
        WindowLabel::default()
    }
}
