//! [`WinOps`] backed by `user32` and `dwmapi`.

use std::{ffi::c_void, mem};

use tracing::trace;
use windodge_engine::{
    Error, Result, WindowId,
    geom::{Point, Rect, Size},
    ops::{PosCommand, WinOps, WindowLabel, ZBand},
};
use windows::Win32::{
    Foundation::{DWM_E_COMPOSITIONDISABLED, E_NOTIMPL, HWND, POINT, RECT},
    Graphics::Dwm::{DWMWA_EXTENDED_FRAME_BOUNDS, DwmGetWindowAttribute},
    UI::WindowsAndMessaging::{
        GetClassNameW, GetCursorPos, GetSystemMetrics, GetWindowRect, GetWindowTextW,
        HWND_NOTOPMOST, HWND_TOPMOST, IsWindow, IsWindowVisible, IsZoomed, SET_WINDOW_POS_FLAGS,
        SM_CXSCREEN, SM_CYSCREEN, SWP_ASYNCWINDOWPOS, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
        SWP_NOZORDER, SWP_SHOWWINDOW, SetWindowPos,
    },
};

/// Longest title or class name read for log labels.
const LABEL_CAP: usize = 256;

/// Live Win32 window manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Ops;

impl Win32Ops {
    /// Construct the ops handle. Call [`crate::enable_per_monitor_dpi`] first.
    pub fn new() -> Self {
        Self
    }
}

/// Handle conversion at the crate boundary.
fn hwnd(id: WindowId) -> HWND {
    HWND(id.0 as *mut c_void)
}

/// Inverse of [`hwnd`].
pub fn window_id(h: HWND) -> WindowId {
    WindowId(h.0 as isize)
}

/// RECT to engine rectangle.
fn rect(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right, r.bottom)
}

/// Arguments for one `SetWindowPos` call.
#[derive(Debug, PartialEq)]
struct SetPos {
    /// Z-order anchor; ignored when `flags` has `SWP_NOZORDER`.
    after: HWND,
    /// Bounding origin.
    origin: Point,
    /// Bounding size.
    size: Size,
    /// Behaviour flags.
    flags: SET_WINDOW_POS_FLAGS,
}

/// Z-order anchor for a band.
fn band_anchor(band: ZBand) -> HWND {
    match band {
        ZBand::TopMost => HWND_TOPMOST,
        ZBand::NotTopMost => HWND_NOTOPMOST,
    }
}

/// Translate a positioning command into `SetWindowPos` arguments.
fn set_pos(cmd: PosCommand) -> SetPos {
    match cmd {
        PosCommand::Place { origin, size, band } => SetPos {
            after: band_anchor(band),
            origin,
            size,
            flags: SWP_SHOWWINDOW | SWP_NOACTIVATE,
        },
        PosCommand::Frame { origin } => SetPos {
            after: HWND::default(),
            origin,
            size: Size::new(0, 0),
            flags: SWP_NOZORDER | SWP_NOSIZE | SWP_NOACTIVATE,
        },
        PosCommand::Band(band) => SetPos {
            after: band_anchor(band),
            origin: Point::new(0, 0),
            size: Size::new(0, 0),
            flags: SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_ASYNCWINDOWPOS,
        },
    }
}

/// Read a UTF-16 string through `read`, or `N/A` when it is empty.
fn read_label(read: impl FnOnce(&mut [u16]) -> i32) -> String {
    let mut buf = [0u16; LABEL_CAP];
    let n = read(&mut buf);
    match usize::try_from(n) {
        Ok(n) if n > 0 => String::from_utf16_lossy(&buf[..n.min(LABEL_CAP)]),
        _ => "N/A".into(),
    }
}

impl WinOps for Win32Ops {
    fn screen_size(&self) -> Size {
        unsafe { Size::new(GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
    }

    fn is_window(&self, id: WindowId) -> bool {
        unsafe { IsWindow(hwnd(id)) }.as_bool()
    }

    fn is_visible(&self, id: WindowId) -> bool {
        unsafe { IsWindowVisible(hwnd(id)) }.as_bool()
    }

    fn is_maximized(&self, id: WindowId) -> bool {
        unsafe { IsZoomed(hwnd(id)) }.as_bool()
    }

    fn window_rect(&self, id: WindowId) -> Result<Rect> {
        if !self.is_window(id) {
            return Err(Error::WindowGone(id));
        }
        let mut r = RECT::default();
        unsafe { GetWindowRect(hwnd(id), &mut r) }.map_err(|e| Error::os("GetWindowRect", e))?;
        Ok(rect(r))
    }

    fn frame_bounds(&self, id: WindowId) -> Result<Rect> {
        if !self.is_window(id) {
            return Err(Error::WindowGone(id));
        }
        let mut r = RECT::default();
        let res = unsafe {
            DwmGetWindowAttribute(
                hwnd(id),
                DWMWA_EXTENDED_FRAME_BOUNDS,
                (&raw mut r).cast::<c_void>(),
                mem::size_of::<RECT>() as u32,
            )
        };
        match res {
            Ok(()) => Ok(rect(r)),
            Err(e) if e.code() == DWM_E_COMPOSITIONDISABLED || e.code() == E_NOTIMPL => {
                Err(Error::Unsupported("extended frame bounds"))
            }
            Err(e) => Err(Error::os("DwmGetWindowAttribute", e)),
        }
    }

    fn cursor_pos(&self) -> Option<Point> {
        let mut p = POINT::default();
        unsafe { GetCursorPos(&mut p) }.ok()?;
        Some(Point::new(p.x, p.y))
    }

    fn apply(&self, id: WindowId, cmd: PosCommand) -> Result<()> {
        if !self.is_window(id) {
            return Err(Error::WindowGone(id));
        }
        let args = set_pos(cmd);
        trace!(%id, ?cmd, "SetWindowPos");
        unsafe {
            SetWindowPos(
                hwnd(id),
                args.after,
                args.origin.x,
                args.origin.y,
                args.size.w,
                args.size.h,
                args.flags,
            )
        }
        .map_err(|e| {
            if self.is_window(id) {
                Error::os("SetWindowPos", e)
            } else {
                Error::WindowGone(id)
            }
        })
    }

    fn label(&self, id: WindowId) -> WindowLabel {
        let h = hwnd(id);
        WindowLabel {
            title: read_label(|buf| unsafe { GetWindowTextW(h, buf) }),
            class: read_label(|buf| unsafe { GetClassNameW(h, buf) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_round_trip() {
        let id = WindowId(0x0004_0a2c);
        assert_eq!(window_id(hwnd(id)), id);
    }

    #[test]
    fn place_shows_and_sets_band_without_activating() {
        let args = set_pos(PosCommand::Place {
            origin: Point::new(50, 50),
            size: Size::new(480, 270),
            band: ZBand::TopMost,
        });
        assert_eq!(args.after, HWND_TOPMOST);
        assert_eq!(args.origin, Point::new(50, 50));
        assert_eq!(args.size, Size::new(480, 270));
        assert!(args.flags.contains(SWP_SHOWWINDOW));
        assert!(args.flags.contains(SWP_NOACTIVATE));
        assert!(!args.flags.contains(SWP_NOZORDER));
    }

    #[test]
    fn frames_only_move() {
        let args = set_pos(PosCommand::Frame {
            origin: Point::new(700, 50),
        });
        assert_eq!(args.origin, Point::new(700, 50));
        assert_eq!(args.flags, SWP_NOZORDER | SWP_NOSIZE | SWP_NOACTIVATE);
    }

    #[test]
    fn band_changes_are_asynchronous() {
        let args = set_pos(PosCommand::Band(ZBand::NotTopMost));
        assert_eq!(args.after, HWND_NOTOPMOST);
        assert!(args.flags.contains(SWP_ASYNCWINDOWPOS));
        assert!(args.flags.contains(SWP_NOMOVE | SWP_NOSIZE));
    }

    #[test]
    fn empty_labels_read_as_na() {
        assert_eq!(read_label(|_| 0), "N/A");
        let got = read_label(|buf| {
            for (slot, c) in buf.iter_mut().zip("Notepad".encode_utf16()) {
                *slot = c;
            }
            7
        });
        assert_eq!(got, "Notepad");
    }

    #[test]
    fn screen_is_nonempty() {
        assert!(Win32Ops::new().screen_size().is_valid());
    }
}
