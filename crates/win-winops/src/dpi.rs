//! Process DPI awareness.

use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

use crate::{Error, Result};

/// Opt the process into per-monitor-v2 DPI awareness so every coordinate the
/// OS hands back is in physical pixels. Must run before any geometry is read.
///
/// Fails when awareness was already fixed, e.g. by an application manifest.
pub fn enable_per_monitor_dpi() -> Result<()> {
    unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
        .map_err(|e| Error::win32("SetProcessDpiAwarenessContext", e))
}
