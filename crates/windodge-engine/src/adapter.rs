//! Geometry adapter: bounding versus visual rectangles.
//!
//! The OS positions windows by their bounding rectangle, which on modern
//! desktops includes an invisible resize border and shadow. Everything the
//! user sees (and everything the resolver reasons about) uses the visual
//! rectangle instead. The adapter reads both, retries transient garbage, and
//! downgrades permanently when the visual source is missing.

use std::time::Duration;

use tracing::{trace, warn};

use crate::{
    Error, Result, WindowId,
    clock::Clock,
    geom::{FramePadding, Rect},
    ops::WinOps,
};

/// Whether the visual-rectangle source is usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Visual rectangles come from the composited frame bounds.
    Full,
    /// Frame bounds are unavailable; bounding rectangles stand in for visual ones.
    BoundingOnly,
}

/// Bounded retry for geometry reads that come back degenerate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(10),
        }
    }
}

/// Reads window geometry in both coordinate spaces.
#[derive(Debug)]
pub struct GeometryAdapter {
    /// One-way capability flag; only ever moves from `Full` to `BoundingOnly`.
    capability: Capability,
    /// Retry policy for degenerate reads.
    retry: RetryPolicy,
}

impl GeometryAdapter {
    /// New adapter that assumes the visual source works until told otherwise.
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            capability: Capability::Full,
            retry,
        }
    }

    /// Current capability.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Raw bounding rectangle, retried while the OS returns a degenerate one.
    pub fn bounding_rect(&self, ops: &dyn WinOps, clock: &dyn Clock, id: WindowId) -> Result<Rect> {
        self.read_with_retry(ops, clock, id, || ops.window_rect(id))
    }

    /// Visual rectangle of the window.
    ///
    /// The first time the frame-bounds query fails, either as unsupported or
    /// with an OS error that survives the retries, the adapter switches to
    /// [`Capability::BoundingOnly`] and never queries it again. Degenerate
    /// rectangles and closed windows do not degrade it.
    pub fn visual_rect(&mut self, ops: &dyn WinOps, clock: &dyn Clock, id: WindowId) -> Result<Rect> {
        if self.capability == Capability::Full {
            match self.read_with_retry(ops, clock, id, || ops.frame_bounds(id)) {
                Err(err @ (Error::Unsupported(_) | Error::Os { .. })) => {
                    self.degrade(&err.to_string());
                }
                other => return other,
            }
        }
        self.bounding_rect(ops, clock, id)
    }

    /// Measure the frame padding of a window. Intended to be called once per
    /// window; the padding is assumed stable for the window's lifetime.
    pub fn frame_padding(
        &mut self,
        ops: &dyn WinOps,
        clock: &dyn Clock,
        id: WindowId,
    ) -> Result<FramePadding> {
        let bounding = self.bounding_rect(ops, clock, id)?;
        let visual = self.visual_rect(ops, clock, id)?;
        let padding = FramePadding::between(&bounding, &visual);
        trace!(%id, %bounding, %visual, %padding, "measured frame padding");
        Ok(padding)
    }

    /// Record that the visual source is gone for good.
    fn degrade(&mut self, what: &str) {
        if self.capability == Capability::Full {
            warn!(
                reason = what,
                "visual window bounds unavailable; falling back to bounding rectangles"
            );
            self.capability = Capability::BoundingOnly;
        }
    }

    /// Run `read` until it yields a valid rectangle or the attempts run out.
    /// Missing windows and unsupported capabilities end the loop immediately.
    /// When the last attempt failed with an OS error, that error is returned
    /// instead of [`Error::GeometryUnavailable`].
    fn read_with_retry<F>(
        &self,
        ops: &dyn WinOps,
        clock: &dyn Clock,
        id: WindowId,
        read: F,
    ) -> Result<Rect>
    where
        F: Fn() -> Result<Rect>,
    {
        let attempts = self.retry.attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            if !ops.is_window(id) {
                return Err(Error::WindowGone(id));
            }
            match read() {
                Ok(rect) if rect.is_valid() => return Ok(rect),
                Ok(rect) => {
                    trace!(%id, attempt, %rect, "degenerate rect");
                    last_err = None;
                }
                Err(err @ (Error::Unsupported(_) | Error::WindowGone(_))) => return Err(err),
                Err(err) => {
                    trace!(%id, attempt, %err, "geometry read failed");
                    last_err = Some(err);
                }
            }
            if attempt < attempts {
                clock.sleep(self.retry.delay);
            }
        }
        Err(match last_err {
            Some(err @ Error::Os { .. }) => err,
            _ => Error::GeometryUnavailable(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        geom::Size,
        mock::{ManualClock, MockWindow, MockWinOps},
    };

    fn setup() -> (MockWinOps, ManualClock, WindowId) {
        let ops = MockWinOps::new(Size::new(1920, 1080));
        let id = ops.add_window(
            MockWindow::new(Rect::new(100, 100, 900, 700)).with_padding(FramePadding {
                left: 7,
                top: 0,
                right: 7,
                bottom: 7,
            }),
        );
        (ops, ManualClock::new(), id)
    }

    #[test]
    fn visual_rect_excludes_padding() {
        let (ops, clock, id) = setup();
        let mut adapter = GeometryAdapter::new(RetryPolicy::default());
        let visual = adapter.visual_rect(&ops, &clock, id).expect("visual");
        assert_eq!(visual, Rect::new(107, 100, 893, 693));
        let padding = adapter.frame_padding(&ops, &clock, id).expect("padding");
        assert_eq!(padding.left, 7);
        assert_eq!(padding.bottom, 7);
        assert_eq!(adapter.capability(), Capability::Full);
    }

    #[test]
    fn degrades_once_and_never_retries() {
        let (ops, clock, id) = setup();
        ops.set_frame_bounds_supported(false);
        let mut adapter = GeometryAdapter::new(RetryPolicy::default());
        let visual = adapter.visual_rect(&ops, &clock, id).expect("visual");
        assert_eq!(visual, Rect::new(100, 100, 900, 700));
        assert_eq!(adapter.capability(), Capability::BoundingOnly);
        assert_eq!(ops.frame_bounds_queries(), 1);

        // Capability returning does not revert the adapter.
        ops.set_frame_bounds_supported(true);
        adapter.visual_rect(&ops, &clock, id).expect("visual");
        assert_eq!(ops.frame_bounds_queries(), 1);
        assert_eq!(adapter.capability(), Capability::BoundingOnly);
    }

    #[test]
    fn failing_frame_bounds_degrade_after_retries() {
        let (ops, clock, id) = setup();
        ops.set_frame_bounds_failing(true);
        let mut adapter = GeometryAdapter::new(RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(5),
        });
        let visual = adapter.visual_rect(&ops, &clock, id).expect("visual");
        assert_eq!(visual, Rect::new(100, 100, 900, 700));
        assert_eq!(adapter.capability(), Capability::BoundingOnly);
        assert_eq!(ops.frame_bounds_queries(), 3);
        assert_eq!(clock.slept(), Duration::from_millis(10));

        adapter.visual_rect(&ops, &clock, id).expect("visual");
        assert_eq!(ops.frame_bounds_queries(), 3);
    }

    #[test]
    fn degenerate_visual_reads_do_not_degrade() {
        let (ops, clock, id) = setup();
        ops.queue_degenerate_reads(id, 10);
        let mut adapter = GeometryAdapter::new(RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(5),
        });
        assert_eq!(
            adapter.visual_rect(&ops, &clock, id),
            Err(Error::GeometryUnavailable(id))
        );
        assert_eq!(adapter.capability(), Capability::Full);
    }

    #[test]
    fn degenerate_reads_are_retried() {
        let (ops, clock, id) = setup();
        ops.queue_degenerate_reads(id, 3);
        let adapter = GeometryAdapter::new(RetryPolicy::default());
        let rect = adapter.bounding_rect(&ops, &clock, id).expect("rect");
        assert_eq!(rect, Rect::new(100, 100, 900, 700));
        assert_eq!(clock.slept(), Duration::from_millis(30));
    }

    #[test]
    fn gives_up_after_bounded_attempts() {
        let (ops, clock, id) = setup();
        ops.queue_degenerate_reads(id, 10);
        let adapter = GeometryAdapter::new(RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(5),
        });
        assert_eq!(
            adapter.bounding_rect(&ops, &clock, id),
            Err(Error::GeometryUnavailable(id))
        );
        assert_eq!(clock.slept(), Duration::from_millis(10));
    }

    #[test]
    fn closed_window_is_reported_immediately() {
        let (ops, clock, id) = setup();
        ops.close(id);
        let mut adapter = GeometryAdapter::new(RetryPolicy::default());
        assert_eq!(
            adapter.visual_rect(&ops, &clock, id),
            Err(Error::WindowGone(id))
        );
        assert_eq!(clock.slept(), Duration::ZERO);
    }
}
