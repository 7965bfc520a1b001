//! Click-to-select via a low-level mouse hook.
//!
//! The hook callback runs on the thread that installed it, inside
//! `GetMessageW`. It judges each left click through the engine's
//! [`SelectionSink`] and posts `WM_QUIT` once enough windows are chosen.

use parking_lot::Mutex;
use tracing::{debug, info};
use windodge_engine::{
    WindowId,
    selection::{Selection, SelectionSink, selection_channel},
};
use windows::{
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM},
        System::{Console::GetConsoleWindow, LibraryLoader::GetModuleHandleW},
        UI::WindowsAndMessaging::{
            CallNextHookEx, DispatchMessageW, GA_ROOT, GetAncestor, GetMessageW, HHOOK,
            IsWindowVisible, MSG, MSLLHOOKSTRUCT, PostQuitMessage, SetWindowsHookExW,
            TranslateMessage, UnhookWindowsHookEx, WH_MOUSE_LL, WM_LBUTTONDOWN, WindowFromPoint,
        },
    },
    core::PCWSTR,
};

use crate::{Error, Result, ops::window_id};

/// Sink for the active selection. The hook procedure has no user-data slot.
static SINK: Mutex<Option<SelectionSink>> = parking_lot::const_mutex(None);

/// Installed hook; removed on drop.
struct MouseHook(HHOOK);

impl MouseHook {
    /// Install [`mouse_proc`] as a global low-level mouse hook.
    fn install() -> Result<Self> {
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .map_err(|e| Error::win32("GetModuleHandleW", e))?;
        let hook = unsafe {
            SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_proc), HINSTANCE(module.0), 0)
        }
        .map_err(Error::Hook)?;
        debug!("mouse hook installed");
        Ok(Self(hook))
    }
}

impl Drop for MouseHook {
    fn drop(&mut self) {
        if let Err(e) = unsafe { UnhookWindowsHookEx(self.0) } {
            debug!(error = %e, "UnhookWindowsHookEx failed");
        }
    }
}

/// Root window under `pt`, if any, and whether it is visible.
fn root_window_at(pt: POINT) -> (Option<WindowId>, bool) {
    let hit = unsafe { WindowFromPoint(pt) };
    if hit.is_invalid() {
        return (None, false);
    }
    let root = unsafe { GetAncestor(hit, GA_ROOT) };
    if root.is_invalid() {
        return (None, false);
    }
    let visible = unsafe { IsWindowVisible(root) }.as_bool();
    (Some(window_id(root)), visible)
}

/// Offer a click to the active sink. Returns true when the click is consumed.
fn on_click(pt: POINT) -> bool {
    let mut guard = SINK.lock();
    let Some(sink) = guard.as_mut() else {
        return false;
    };
    let (candidate, visible) = root_window_at(pt);
    let verdict = sink.offer(candidate, visible);
    if verdict.is_complete() {
        unsafe { PostQuitMessage(0) };
    }
    verdict.consumes()
}

/// Low-level mouse hook procedure.
unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && wparam.0 == WM_LBUTTONDOWN as usize {
        // SAFETY: for WH_MOUSE_LL, lparam points at an MSLLHOOKSTRUCT.
        let info = unsafe { &*(lparam.0 as *const MSLLHOOKSTRUCT) };
        if on_click(info.pt) {
            return LRESULT(1);
        }
    }
    unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) }
}

/// Pump messages until `WM_QUIT` or an error.
fn pump() {
    let mut msg = MSG::default();
    loop {
        let got = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) }.0;
        if got == 0 || got == -1 {
            break;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// Turn a drained selection into the final window list.
fn finish(selection: Selection, wanted: usize) -> Result<Vec<WindowId>> {
    if selection.complete && selection.windows.len() >= wanted {
        Ok(selection.windows)
    } else {
        Err(Error::IncompleteSelection {
            got: selection.windows.len(),
            wanted,
        })
    }
}

/// Let the user click `count` distinct top-level windows. Blocks until done.
///
/// Accepted clicks are swallowed; the console hosting this process can never
/// be chosen.
pub fn select_windows(count: usize) -> Result<Vec<WindowId>> {
    let console = unsafe { GetConsoleWindow() };
    let console = (!console.is_invalid()).then(|| window_id(console));
    let (sink, queue) = selection_channel(count, console);
    let wanted = queue.wanted();
    *SINK.lock() = Some(sink);

    let hook = match MouseHook::install() {
        Ok(h) => h,
        Err(e) => {
            SINK.lock().take();
            return Err(e);
        }
    };
    info!(wanted, "click on the windows to control");
    pump();
    drop(hook);
    SINK.lock().take();

    finish(queue.drain(), wanted)
}
