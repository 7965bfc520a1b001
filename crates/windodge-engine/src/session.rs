//! Session orchestrator: owns the controlled windows and drives the poll loop.

use std::{sync::Arc, time::Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    Corner, Error, Result, WindowId,
    adapter::{Capability, GeometryAdapter},
    clock::Clock,
    config::DodgeConfig,
    geom::{FramePadding, Point, Rect, Size},
    intent::ideal_corner,
    motion::{MotionController, MotionOutcome},
    ops::{PosCommand, WinOps, ZBand},
    resolve::{OverlapResolver, Placement},
    sizing::fit_size,
};

/// A window under session control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlledWindow {
    /// OS handle.
    id: WindowId,
    /// Corner the window currently occupies.
    corner: Corner,
    /// Visual rectangle as of the last refresh.
    visual: Rect,
    /// Visual size fixed at initialization.
    size: Size,
    /// Invisible frame measured at initialization.
    padding: FramePadding,
    /// The window may not dodge again before this instant.
    cooldown_until: Option<Instant>,
}

impl ControlledWindow {
    /// OS handle.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Current corner.
    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Cached visual rectangle.
    pub fn visual_rect(&self) -> Rect {
        self.visual
    }

    /// Target visual size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Frame padding.
    pub fn padding(&self) -> FramePadding {
        self.padding
    }

    /// True while the window is cooling down after a dodge.
    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Where the resolver should consider this window to be.
    fn placement(&self) -> Placement {
        Placement {
            id: self.id,
            rect: self.visual,
        }
    }
}

/// Result of one poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Windows were checked; `moved` of them dodged.
    Active {
        /// Windows that moved this cycle.
        moved: usize,
    },
    /// A window is maximized or too large; dodging is suspended.
    Paused,
    /// No controlled windows remain.
    Finished,
}

/// Why [`Session::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The cancellation token fired.
    Cancelled,
    /// Every controlled window was closed.
    Finished,
}

/// A running dodge session.
///
/// Dropping the session releases the always-on-top flag on every window it
/// still controls.
pub struct Session {
    /// Window-manager collaborator.
    ops: Arc<dyn WinOps>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Immutable settings.
    config: DodgeConfig,
    /// Primary screen size, read once.
    screen: Size,
    /// Corner search.
    resolver: OverlapResolver,
    /// Bounding/visual rectangle reads.
    adapter: GeometryAdapter,
    /// Controlled windows, in selection order.
    windows: Vec<ControlledWindow>,
    /// True while a too-large window suspends dodging.
    paused: bool,
    /// Set once cleanup has run.
    released: bool,
}

impl Session {
    /// Bring `selected` windows under control: size them, give each an
    /// initial corner, and pin them on top.
    ///
    /// Windows that cannot be placed are skipped with a warning. Fails with
    /// [`Error::NoWindows`] when none survive.
    pub fn initialize(
        ops: Arc<dyn WinOps>,
        clock: Arc<dyn Clock>,
        config: DodgeConfig,
        selected: &[WindowId],
    ) -> Result<Self> {
        config.validate()?;
        let screen = ops.screen_size();
        info!(
            %screen,
            corners = %config.corners,
            resize = config.resize,
            gap = config.gap,
            "initializing session"
        );
        let mut session = Self {
            resolver: config.resolver(screen),
            adapter: GeometryAdapter::new(config.retry),
            ops,
            clock,
            config,
            screen,
            windows: Vec::with_capacity(selected.len()),
            paused: false,
            released: false,
        };

        for (index, &id) in selected.iter().enumerate() {
            match session.adopt(index, id) {
                Ok(Some(window)) => {
                    info!(%id, corner = %window.corner, size = %window.size, "window under control");
                    session.windows.push(window);
                }
                Ok(None) => {}
                Err(err) => warn!(%id, %err, "skipping window"),
            }
        }

        if session.windows.is_empty() {
            return Err(Error::NoWindows);
        }
        Ok(session)
    }

    /// Controlled windows, in selection order.
    pub fn windows(&self) -> &[ControlledWindow] {
        &self.windows
    }

    /// True while dodging is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Screen size the session lays windows out on.
    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Whether visual rectangles are still read from the compositor.
    pub fn capability(&self) -> Capability {
        self.adapter.capability()
    }

    /// Prepare one selected window. `Ok(None)` means it was skipped and the
    /// reason has already been logged.
    fn adopt(&mut self, index: usize, id: WindowId) -> Result<Option<ControlledWindow>> {
        let ops = Arc::clone(&self.ops);
        let clock = Arc::clone(&self.clock);
        if !ops.is_window(id) {
            warn!(%id, "selected window no longer exists; skipping");
            return Ok(None);
        }
        info!(%id, label = %ops.label(id), "initializing window");

        let padding = self.adapter.frame_padding(ops.as_ref(), clock.as_ref(), id)?;
        let initial = self.adapter.visual_rect(ops.as_ref(), clock.as_ref(), id)?;
        let Some(size) = fit_size(initial.size(), self.screen, &self.config.sizing()) else {
            warn!(%id, initial = %initial.size(), "no usable size for window; skipping");
            return Ok(None);
        };

        let placed: Vec<Placement> = self.windows.iter().map(ControlledWindow::placement).collect();
        let Some(corner) = self.resolver.initial_corner(index, size, &placed, id) else {
            warn!(%id, "no free corner for window; skipping");
            return Ok(None);
        };
        let preferred = self.resolver.allowed().nth_cyclic(index);
        if corner != preferred {
            debug!(%id, %preferred, %corner, "initial corner occupied; using next free corner");
        }

        let target = corner.target_coordinates(self.screen, size, self.config.gap);
        MotionController::new(ops.as_ref(), clock.as_ref(), self.config.timing()).instant_move(
            id,
            padding.bounding_origin(target),
            padding.bounding_size(size),
            true,
        )?;

        let visual = match self.adapter.visual_rect(ops.as_ref(), clock.as_ref(), id) {
            Ok(rect) => rect,
            Err(err) => {
                warn!(%id, %err, "could not read window after initial placement; skipping");
                if let Err(err) = ops.apply(id, PosCommand::Band(ZBand::NotTopMost)) {
                    debug!(%id, %err, "failed to release skipped window");
                }
                return Ok(None);
            }
        };

        Ok(Some(ControlledWindow {
            id,
            corner,
            visual,
            size,
            padding,
            cooldown_until: None,
        }))
    }

    /// Run one poll cycle, without the trailing sleep.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.released {
            return Ok(TickOutcome::Finished);
        }
        self.prune();
        if self.windows.is_empty() {
            info!("all controlled windows have been closed");
            return Ok(TickOutcome::Finished);
        }
        self.reassert_topmost();
        self.refresh();
        if self.update_pause() {
            return Ok(TickOutcome::Paused);
        }

        let mut moved = 0;
        for index in 0..self.windows.len() {
            match self.dodge(index) {
                Ok(true) => moved += 1,
                Ok(false) => {}
                Err(err) if err.is_transient() => {
                    debug!(id = %self.windows[index].id, %err, "dodge skipped this cycle");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(TickOutcome::Active { moved })
    }

    /// Poll until `cancel` fires, every window is gone, or a cycle fails.
    /// Windows are released on every exit path.
    pub fn run(&mut self, cancel: &CancellationToken) -> Result<RunOutcome> {
        info!(windows = self.windows.len(), "dodging; interrupt to stop");
        let result = loop {
            if cancel.is_cancelled() {
                info!("interrupted");
                break Ok(RunOutcome::Cancelled);
            }
            match self.tick() {
                Ok(TickOutcome::Finished) => break Ok(RunOutcome::Finished),
                Ok(_) => {}
                Err(err) => break Err(err),
            }
            self.clock.sleep(self.config.poll);
        };
        self.release();
        result
    }

    /// Clear the always-on-top flag on every window still alive. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for w in &self.windows {
            if !self.ops.is_window(w.id) {
                continue;
            }
            match self.ops.apply(w.id, PosCommand::Band(ZBand::NotTopMost)) {
                Ok(()) => debug!(id = %w.id, "released always-on-top"),
                Err(err) => warn!(id = %w.id, %err, "failed to release always-on-top"),
            }
        }
        info!("session released");
    }

    /// Drop windows whose handles have become invalid.
    fn prune(&mut self) {
        let ops = &self.ops;
        self.windows.retain(|w| {
            let alive = ops.is_window(w.id);
            if !alive {
                info!(id = %w.id, "window closed; no longer controlled");
            }
            alive
        });
    }

    /// Re-apply top-most ordering. Best effort.
    fn reassert_topmost(&self) {
        for w in &self.windows {
            if let Err(err) = self.ops.apply(w.id, PosCommand::Band(ZBand::TopMost)) {
                trace!(id = %w.id, %err, "top-most reassert failed");
            }
        }
    }

    /// Re-read every cached visual rectangle. Failed reads keep the old value.
    fn refresh(&mut self) {
        for w in &mut self.windows {
            match self
                .adapter
                .visual_rect(self.ops.as_ref(), self.clock.as_ref(), w.id)
            {
                Ok(rect) => w.visual = rect,
                Err(err) => trace!(id = %w.id, %err, "refresh failed; keeping cached rect"),
            }
        }
    }

    /// Update the pause flag, logging transitions. Returns the new state.
    fn update_pause(&mut self) -> bool {
        let screen_area = self.screen.area() as f64;
        let threshold = self.config.pause_threshold;
        let culprit = self.windows.iter().find(|w| {
            self.ops.is_maximized(w.id) || w.visual.size().area() as f64 / screen_area > threshold
        });
        match (culprit, self.paused) {
            (Some(w), false) => {
                info!(id = %w.id, "window maximized or too large; pausing dodge");
                self.paused = true;
            }
            (None, true) => {
                info!("all windows back to normal size; resuming dodge");
                self.paused = false;
            }
            _ => {}
        }
        self.paused
    }

    /// Dodge the cursor with window `index` if it is inside. Returns whether
    /// the window moved.
    fn dodge(&mut self, index: usize) -> Result<bool> {
        let ops = Arc::clone(&self.ops);
        let clock = Arc::clone(&self.clock);
        let mut w = self.windows[index];
        if w.in_cooldown(clock.now()) || !ops.is_window(w.id) {
            return Ok(false);
        }

        w.visual = self
            .adapter
            .visual_rect(ops.as_ref(), clock.as_ref(), w.id)?;
        self.windows[index] = w;
        let Some(cursor) = ops.cursor_pos() else {
            return Ok(false);
        };
        if !w.visual.contains(cursor) {
            return Ok(false);
        }

        let ideal = ideal_corner(w.corner, cursor.x, cursor.y, &w.visual);
        let others: Vec<Placement> = self.windows.iter().map(ControlledWindow::placement).collect();
        let safe = self
            .resolver
            .safe_corner(w.corner, ideal, w.size, &others, w.id);
        if safe == w.corner {
            trace!(id = %w.id, %ideal, "no safe corner to dodge to");
            return Ok(false);
        }

        let start = self
            .adapter
            .bounding_rect(ops.as_ref(), clock.as_ref(), w.id)?
            .origin();
        let target = safe.target_coordinates(self.screen, w.size, self.config.gap);
        let end = w.padding.bounding_origin(target);
        let motion = MotionController::new(ops.as_ref(), clock.as_ref(), self.config.timing())
            .animated_move(w.id, start, end, w.padding.bounding_size(w.size));
        match motion {
            Ok(MotionOutcome::Interrupted { frames }) => {
                debug!(id = %w.id, frames, "dodge interrupted; window closed");
                return Ok(false);
            }
            Ok(outcome) => {
                info!(id = %w.id, from = %w.corner, to = %safe, %cursor, ?outcome, "dodged");
            }
            // The frames may already have carried the window to the target.
            Err(err) if err.is_transient() && landed(ops.as_ref(), w.id, end) => {
                debug!(id = %w.id, to = %safe, %err, "final placement failed; window at target");
            }
            Err(err) => return Err(err),
        }

        w.corner = safe;
        w.visual = safe.target_rect(self.screen, w.size, self.config.gap);
        w.cooldown_until = Some(clock.now() + self.config.cooldown);
        self.windows[index] = w;
        Ok(true)
    }
}

/// True when the bounding origin of `id` reads back as `origin`.
fn landed(ops: &dyn WinOps, id: WindowId, origin: Point) -> bool {
    ops.window_rect(id).is_ok_and(|r| r.origin() == origin)
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}
