//! windodge-engine: the placement and avoidance core of windodge.
//!
//! A [`session::Session`] keeps a handful of windows pinned to screen corners
//! and moves each one away when the cursor enters it. The engine never
//! touches the OS directly; everything goes through the [`ops::WinOps`]
//! trait, which has a Win32 implementation in `win-winops` and an in-memory
//! one in [`mock`].
//!
//! Coordinates are physical screen pixels. Every rectangle the engine reasons
//! about is the *visual* rectangle; conversion to and from the OS bounding
//! rectangle happens in [`adapter`] and through [`geom::FramePadding`].

use std::fmt;

pub mod adapter;
pub mod clock;
pub mod config;
mod corner;
mod error;
pub mod geom;
mod intent;
pub mod mock;
pub mod motion;
pub mod ops;
pub mod resolve;
pub mod selection;
pub mod session;
pub mod sizing;


pub use config::{DodgeConfig, RawConfig};
pub use corner::{Corner, CornerSet};
pub use error::{Error, Result};
pub use intent::ideal_corner;
pub use session::{RunOutcome, Session, TickOutcome};

/// Opaque OS window handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub isize);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
