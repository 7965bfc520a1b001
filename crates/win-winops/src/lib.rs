#![cfg(windows)]
//! win-winops: Win32 window operations for windodge.
//!
//! Provides [`Win32Ops`], the [`windodge_engine::ops::WinOps`] implementation
//! backed by `user32`/`dwmapi`, per-monitor DPI opt-in, and the click-to-select
//! phase driven by a low-level mouse hook.
//!
//! Handles cross the engine boundary as [`windodge_engine::WindowId`]; the raw
//! `HWND` never leaves this crate.

mod dpi;
mod error;
mod ops;
mod select;

pub use dpi::enable_per_monitor_dpi;
pub use error::{Error, Result};
pub use ops::Win32Ops;
pub use select::select_windows;
