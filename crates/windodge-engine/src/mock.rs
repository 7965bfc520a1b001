//! In-memory window manager and manual clock for tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{
    Error, Result, WindowId,
    clock::Clock,
    geom::{FramePadding, Point, Rect, Size},
    ops::{PosCommand, WinOps, WindowLabel, ZBand},
};

/// A recorded interaction with [`MockWinOps`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    /// A positioning command that reached a live window.
    Apply(WindowId, PosCommand),
    /// A frame-bounds query, supported or not.
    FrameBounds(WindowId),
}

/// State of one simulated window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockWindow {
    /// Bounding rectangle.
    pub bounding: Rect,
    /// Invisible frame around the visual area.
    pub padding: FramePadding,
    /// Visible flag.
    pub visible: bool,
    /// Maximized flag.
    pub maximized: bool,
    /// Cleared when the window is closed.
    pub alive: bool,
    /// Current z-order band.
    pub topmost: bool,
    /// Title reported through [`WinOps::label`].
    pub title: String,
    /// Number of geometry reads that will come back degenerate.
    degenerate_reads: u32,
    /// Close the window once this many more frames have been applied.
    frames_until_close: Option<u32>,
    /// Reject positioning commands with an OS error.
    failing: bool,
    /// Reject only `Place` commands with an OS error.
    failing_places: bool,
}

impl MockWindow {
    /// A visible, restored window with no frame padding.
    pub fn new(bounding: Rect) -> Self {
        Self {
            bounding,
            padding: FramePadding::default(),
            visible: true,
            maximized: false,
            alive: true,
            topmost: false,
            title: "Untitled".into(),
            degenerate_reads: 0,
            frames_until_close: None,
            failing: false,
            failing_places: false,
        }
    }

    /// Builder: set the invisible frame.
    pub fn with_padding(mut self, padding: FramePadding) -> Self {
        self.padding = padding;
        self
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Visual rectangle implied by the bounding rectangle and padding.
    pub fn visual(&self) -> Rect {
        self.padding.to_visual(&self.bounding)
    }
}

/// Deterministic `WinOps` implementation backed by a window table.
///
/// Clones share state, so a test can keep a handle while the session owns
/// another.
#[derive(Clone)]
pub struct MockWinOps {
    /// Primary screen size.
    screen: Size,
    /// Simulated windows, closed ones included.
    windows: Arc<Mutex<HashMap<WindowId, MockWindow>>>,
    /// Cursor position, `None` when unreadable.
    cursor: Arc<Mutex<Option<Point>>>,
    /// Positions handed out by successive cursor reads before `cursor` applies.
    cursor_script: Arc<Mutex<VecDeque<Point>>>,
    /// Interaction log.
    calls: Arc<Mutex<Vec<Call>>>,
    /// Whether frame bounds are available.
    frame_bounds_supported: Arc<AtomicBool>,
    /// Whether frame-bounds queries fail with an OS error.
    frame_bounds_failing: Arc<AtomicBool>,
    /// Simulated cost of each positioning command.
    latency: Arc<Mutex<Option<(ManualClock, Duration)>>>,
}

impl MockWinOps {
    /// Empty window table on a screen of `screen` pixels.
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            windows: Arc::new(Mutex::new(HashMap::new())),
            cursor: Arc::new(Mutex::new(None)),
            cursor_script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            frame_bounds_supported: Arc::new(AtomicBool::new(true)),
            frame_bounds_failing: Arc::new(AtomicBool::new(false)),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Register a window and return its handle.
    pub fn add_window(&self, window: MockWindow) -> WindowId {
        let mut g = self.windows.lock();
        let id = WindowId(0x10 * (g.len() as isize + 1));
        g.insert(id, window);
        id
    }

    /// Snapshot of a window's state.
    pub fn window(&self, id: WindowId) -> Option<MockWindow> {
        self.windows.lock().get(&id).cloned()
    }

    /// Current bounding rectangle.
    pub fn rect(&self, id: WindowId) -> Option<Rect> {
        self.window(id).map(|w| w.bounding)
    }

    /// Current visual rectangle.
    pub fn visual(&self, id: WindowId) -> Option<Rect> {
        self.window(id).map(|w| w.visual())
    }

    /// True when the window is in the top-most band.
    pub fn is_topmost(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(|w| w.topmost)
    }

    /// Move the cursor.
    pub fn set_cursor(&self, p: Point) {
        *self.cursor.lock() = Some(p);
    }

    /// Script the next cursor reads, one point per read. The last point
    /// sticks once the script runs out.
    pub fn queue_cursor(&self, points: impl IntoIterator<Item = Point>) {
        self.cursor_script.lock().extend(points);
    }

    /// Make the cursor unreadable.
    pub fn hide_cursor(&self) {
        *self.cursor.lock() = None;
    }

    /// Replace a window's bounding rectangle, as if the user dragged it.
    pub fn set_bounding(&self, id: WindowId, rect: Rect) {
        self.update(id, |w| w.bounding = rect);
    }

    /// Maximize or restore a window.
    pub fn set_maximized(&self, id: WindowId, maximized: bool) {
        self.update(id, |w| w.maximized = maximized);
    }

    /// Show or hide a window.
    pub fn set_visible(&self, id: WindowId, visible: bool) {
        self.update(id, |w| w.visible = visible);
    }

    /// Close a window; its handle becomes invalid.
    pub fn close(&self, id: WindowId) {
        self.update(id, |w| w.alive = false);
    }

    /// Close a window after `frames` more animation frames have been applied.
    pub fn close_after_frames(&self, id: WindowId, frames: u32) {
        self.update(id, |w| w.frames_until_close = Some(frames));
    }

    /// Make the next `n` geometry reads for `id` return a degenerate rectangle.
    pub fn queue_degenerate_reads(&self, id: WindowId, n: u32) {
        self.update(id, |w| w.degenerate_reads = n);
    }

    /// Make positioning commands for `id` fail with an OS error.
    pub fn set_apply_failing(&self, id: WindowId, failing: bool) {
        self.update(id, |w| w.failing = failing);
    }

    /// Make only `Place` commands for `id` fail; frames and band changes still work.
    pub fn set_place_failing(&self, id: WindowId, failing: bool) {
        self.update(id, |w| w.failing_places = failing);
    }

    /// Toggle frame-bounds support.
    pub fn set_frame_bounds_supported(&self, supported: bool) {
        self.frame_bounds_supported
            .store(supported, Ordering::SeqCst);
    }

    /// Make frame-bounds queries fail with an OS error (not "unsupported").
    pub fn set_frame_bounds_failing(&self, failing: bool) {
        self.frame_bounds_failing.store(failing, Ordering::SeqCst);
    }

    /// Advance `clock` by `latency` on every positioning command.
    pub fn set_apply_latency(&self, clock: &ManualClock, latency: Duration) {
        *self.latency.lock() = Some((clock.clone(), latency));
    }

    /// Number of frame-bounds queries issued so far.
    pub fn frame_bounds_queries(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::FrameBounds(_)))
            .count()
    }

    /// Full interaction log.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Positioning commands that reached `id`, in order.
    pub fn commands(&self, id: WindowId) -> Vec<PosCommand> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Apply(target, cmd) if *target == id => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Mutate a window in place; unknown ids are ignored.
    fn update(&self, id: WindowId, f: impl FnOnce(&mut MockWindow)) {
        if let Some(w) = self.windows.lock().get_mut(&id) {
            f(w);
        }
    }

    /// Shared read path for both rectangle flavors.
    fn read(&self, id: WindowId, project: impl FnOnce(&MockWindow) -> Rect) -> Result<Rect> {
        let mut g = self.windows.lock();
        let w = g
            .get_mut(&id)
            .filter(|w| w.alive)
            .ok_or(Error::WindowGone(id))?;
        if w.degenerate_reads > 0 {
            w.degenerate_reads -= 1;
            return Ok(Rect::default());
        }
        Ok(project(w))
    }
}

impl WinOps for MockWinOps {
    fn screen_size(&self) -> Size {
        self.screen
    }

    fn is_window(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(|w| w.alive)
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(|w| w.alive && w.visible)
    }

    fn is_maximized(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(|w| w.alive && w.maximized)
    }

    fn window_rect(&self, id: WindowId) -> Result<Rect> {
        self.read(id, |w| w.bounding)
    }

    fn frame_bounds(&self, id: WindowId) -> Result<Rect> {
        self.calls.lock().push(Call::FrameBounds(id));
        if !self.frame_bounds_supported.load(Ordering::SeqCst) {
            return Err(Error::Unsupported("extended frame bounds"));
        }
        if self.frame_bounds_failing.load(Ordering::SeqCst) {
            return Err(Error::os("DwmGetWindowAttribute", "E_INVALIDARG"));
        }
        self.read(id, MockWindow::visual)
    }

    fn cursor_pos(&self) -> Option<Point> {
        let mut cursor = self.cursor.lock();
        if let Some(next) = self.cursor_script.lock().pop_front() {
            *cursor = Some(next);
        }
        *cursor
    }

    fn apply(&self, id: WindowId, cmd: PosCommand) -> Result<()> {
        if let Some((clock, latency)) = self.latency.lock().as_ref() {
            clock.advance(*latency);
        }
        let mut g = self.windows.lock();
        let w = g
            .get_mut(&id)
            .filter(|w| w.alive)
            .ok_or(Error::WindowGone(id))?;
        if w.failing || (w.failing_places && matches!(cmd, PosCommand::Place { .. })) {
            return Err(Error::os("SetWindowPos", "access is denied"));
        }
        self.calls.lock().push(Call::Apply(id, cmd));
        match cmd {
            PosCommand::Place { origin, size, band } => {
                w.bounding = Rect::from_origin_size(origin, size);
                w.topmost = band == ZBand::TopMost;
                w.visible = true;
            }
            PosCommand::Frame { origin } => {
                w.bounding = w.bounding.with_origin(origin);
                if let Some(left) = w.frames_until_close.as_mut() {
                    *left = left.saturating_sub(1);
                    if *left == 0 {
                        w.alive = false;
                        w.frames_until_close = None;
                    }
                }
            }
            PosCommand::Band(band) => w.topmost = band == ZBand::TopMost,
        }
        Ok(())
    }

    fn label(&self, id: WindowId) -> WindowLabel {
        self.window(id)
            .map(|w| WindowLabel {
                title: w.title,
                class: "MockWindow".into(),
            })
            .unwrap_or_default()
    }
}

/// Shared state behind [`ManualClock`].
#[derive(Debug)]
struct ClockState {
    /// Time the clock was created.
    base: Instant,
    /// Simulated time elapsed since `base`.
    offset: Duration,
    /// Portion of `offset` spent in [`Clock::sleep`].
    slept: Duration,
}

/// Clock that only moves when slept or advanced. Clones share state.
#[derive(Clone, Debug)]
pub struct ManualClock {
    /// Shared state.
    state: Arc<Mutex<ClockState>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                base: Instant::now(),
                offset: Duration::ZERO,
                slept: Duration::ZERO,
            })),
        }
    }

    /// Move time forward without counting it as sleep.
    pub fn advance(&self, d: Duration) {
        self.state.lock().offset += d;
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().offset
    }

    /// Total time spent sleeping.
    pub fn slept(&self) -> Duration {
        self.state.lock().slept
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let s = self.state.lock();
        s.base + s.offset
    }

    fn sleep(&self, d: Duration) {
        let mut s = self.state.lock();
        s.offset += d;
        s.slept += d;
    }
}
