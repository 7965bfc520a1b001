//! Motion controller: instant placement and eased, frame-paced animation.

use std::time::Duration;

use tracing::{debug, trace};

use crate::{
    Error, Result, WindowId,
    clock::Clock,
    geom::{Point, Size},
    ops::{PosCommand, WinOps, ZBand},
};

/// Quadratic ease-out: fast start, slow finish. `t` is clamped to `[0, 1]`.
#[inline]
pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Interpolate between `a` and `b` by `t`, truncating towards zero like the
/// OS positioning call expects.
#[inline]
fn lerp(a: i32, b: i32, t: f64) -> i32 {
    (f64::from(a) + f64::from(b - a) * t) as i32
}

/// Animation timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionTiming {
    /// Total animation time.
    pub duration: Duration,
    /// Target frames per second.
    pub fps: u32,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(250),
            fps: 60,
        }
    }
}

impl MotionTiming {
    /// Number of frames in a full animation; zero means "move instantly".
    pub fn frame_count(&self) -> u32 {
        (self.duration.as_secs_f64() * f64::from(self.fps)) as u32
    }

    /// Offset of frame `index` from the animation start.
    fn frame_offset(&self, index: u32) -> Duration {
        Duration::from_secs_f64(f64::from(index) / f64::from(self.fps))
    }
}

/// How a move was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionOutcome {
    /// A single placement, no intermediate frames.
    Instant,
    /// Intermediate frames followed by the final placement.
    Animated {
        /// Intermediate frames sent.
        frames: u32,
    },
    /// The window vanished mid-animation; the final placement was still attempted.
    Interrupted {
        /// Intermediate frames sent before the window vanished.
        frames: u32,
    },
}

/// Executes moves against the window manager. Blocking: an animated move owns
/// the calling thread until the final placement has been issued.
pub struct MotionController<'a> {
    /// Window-manager collaborator.
    ops: &'a dyn WinOps,
    /// Time source for frame pacing.
    clock: &'a dyn Clock,
    /// Animation timing.
    timing: MotionTiming,
}

impl<'a> MotionController<'a> {
    /// Construct a controller for one batch of moves.
    pub fn new(ops: &'a dyn WinOps, clock: &'a dyn Clock, timing: MotionTiming) -> Self {
        Self { ops, clock, timing }
    }

    /// Place the bounding box at `origin` with `size` in a single command.
    pub fn instant_move(
        &self,
        id: WindowId,
        origin: Point,
        size: Size,
        always_on_top: bool,
    ) -> Result<()> {
        let band = if always_on_top {
            ZBand::TopMost
        } else {
            ZBand::NotTopMost
        };
        self.ops.apply(id, PosCommand::Place { origin, size, band })
    }

    /// Animate the bounding box from `start` to `end`, keeping `size`.
    ///
    /// Intermediate frames move only; the final placement re-applies size and
    /// top-most ordering. Frames are scheduled against the start time rather
    /// than slept at a fixed interval, so slow frames do not accumulate drift.
    pub fn animated_move(
        &self,
        id: WindowId,
        start: Point,
        end: Point,
        size: Size,
    ) -> Result<MotionOutcome> {
        let total = self.timing.frame_count();
        if total == 0 {
            self.instant_move(id, end, size, true)?;
            return Ok(MotionOutcome::Instant);
        }

        let duration = self.timing.duration.as_secs_f64();
        let started = self.clock.now();
        let mut sent = 0u32;
        let mut interrupted = false;
        for frame in 0..=total {
            if !self.ops.is_window(id) {
                interrupted = true;
                break;
            }
            let elapsed = self.clock.now().saturating_duration_since(started);
            let linear = (elapsed.as_secs_f64() / duration).min(1.0);
            let eased = ease_out_quad(linear);
            let origin = Point::new(lerp(start.x, end.x, eased), lerp(start.y, end.y, eased));
            match self.ops.apply(id, PosCommand::Frame { origin }) {
                Ok(()) => sent += 1,
                Err(Error::WindowGone(_)) => {
                    interrupted = true;
                    break;
                }
                Err(err) => trace!(%id, frame, %err, "frame move failed"),
            }

            let due = started + self.timing.frame_offset(frame + 1);
            let remaining = due.saturating_duration_since(self.clock.now());
            if !remaining.is_zero() {
                self.clock.sleep(remaining);
            }
            if linear >= 1.0 {
                break;
            }
        }

        if interrupted {
            debug!(%id, frames = sent, "window vanished mid-animation");
            match self.instant_move(id, end, size, true) {
                Ok(()) | Err(Error::WindowGone(_)) => {}
                Err(err) => return Err(err),
            }
            return Ok(MotionOutcome::Interrupted { frames: sent });
        }
        self.instant_move(id, end, size, true)?;
        Ok(MotionOutcome::Animated { frames: sent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Rect,
        mock::{Call, ManualClock, MockWindow, MockWinOps},
    };

    const SIZE: Size = Size::new(400, 300);

    fn setup() -> (MockWinOps, ManualClock, WindowId) {
        let ops = MockWinOps::new(Size::new(1920, 1080));
        let id = ops.add_window(MockWindow::new(Rect::new(50, 50, 450, 350)));
        (ops, ManualClock::new(), id)
    }

    fn frames(ops: &MockWinOps) -> Vec<Point> {
        ops.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Apply(_, PosCommand::Frame { origin }) => Some(origin),
                _ => None,
            })
            .collect()
    }

    fn places(ops: &MockWinOps) -> Vec<PosCommand> {
        ops.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Apply(_, cmd @ PosCommand::Place { .. }) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn easing_curve_shape() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(0.5), 0.75);
        assert_eq!(ease_out_quad(2.0), 1.0);
        assert_eq!(ease_out_quad(-1.0), 0.0);
    }

    #[test]
    fn frame_count_from_timing() {
        assert_eq!(MotionTiming::default().frame_count(), 15);
        let zero = MotionTiming {
            duration: Duration::ZERO,
            fps: 60,
        };
        assert_eq!(zero.frame_count(), 0);
        let no_fps = MotionTiming {
            duration: Duration::from_millis(250),
            fps: 0,
        };
        assert_eq!(no_fps.frame_count(), 0);
    }

    #[test]
    fn degenerate_timing_is_one_placement() {
        for timing in [
            MotionTiming {
                duration: Duration::ZERO,
                fps: 60,
            },
            MotionTiming {
                duration: Duration::from_millis(250),
                fps: 0,
            },
        ] {
            let (ops, clock, id) = setup();
            let motion = MotionController::new(&ops, &clock, timing);
            let outcome = motion
                .animated_move(id, Point::new(50, 50), Point::new(1470, 50), SIZE)
                .expect("move");
            assert_eq!(outcome, MotionOutcome::Instant);
            assert!(frames(&ops).is_empty());
            assert_eq!(
                places(&ops),
                vec![PosCommand::Place {
                    origin: Point::new(1470, 50),
                    size: SIZE,
                    band: ZBand::TopMost,
                }]
            );
        }
    }

    #[test]
    fn animation_is_eased_and_paced() {
        let (ops, clock, id) = setup();
        let timing = MotionTiming {
            duration: Duration::from_millis(100),
            fps: 10,
        };
        let motion = MotionController::new(&ops, &clock, timing);
        let outcome = motion
            .animated_move(id, Point::new(0, 0), Point::new(1000, 0), SIZE)
            .expect("move");

        // One frame per 100ms tick: t = 0 and t = 1.
        assert_eq!(outcome, MotionOutcome::Animated { frames: 2 });
        assert_eq!(frames(&ops), vec![Point::new(0, 0), Point::new(1000, 0)]);
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
        assert_eq!(ops.rect(id).map(|r| r.origin()), Some(Point::new(1000, 0)));
    }

    #[test]
    fn intermediate_frames_follow_the_curve() {
        let (ops, clock, id) = setup();
        let timing = MotionTiming {
            duration: Duration::from_millis(250),
            fps: 4,
        };
        let motion = MotionController::new(&ops, &clock, timing);
        motion
            .animated_move(id, Point::new(0, 100), Point::new(1000, 500), SIZE)
            .expect("move");
        // t = 0, 0.25/0.25 clamps to 1.0 at the second frame.
        let xs: Vec<i32> = frames(&ops).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 1000]);

        let (ops, clock, id) = setup();
        let timing = MotionTiming {
            duration: Duration::from_secs(1),
            fps: 4,
        };
        let motion = MotionController::new(&ops, &clock, timing);
        motion
            .animated_move(id, Point::new(0, 0), Point::new(1000, 0), SIZE)
            .expect("move");
        // t = 0, .25, .5, .75, 1 -> eased 0, .4375, .75, .9375, 1
        let xs: Vec<i32> = frames(&ops).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 437, 750, 937, 1000]);
        assert_eq!(clock.elapsed(), Duration::from_millis(1250));
    }

    #[test]
    fn slow_frames_end_early_with_exact_placement() {
        let (ops, clock, id) = setup();
        // Every OS call takes longer than the whole animation.
        ops.set_apply_latency(&clock, Duration::from_millis(300));
        let motion = MotionController::new(&ops, &clock, MotionTiming::default());
        let outcome = motion
            .animated_move(id, Point::new(0, 0), Point::new(800, 600), SIZE)
            .expect("move");
        assert_eq!(outcome, MotionOutcome::Animated { frames: 2 });
        let last = places(&ops).pop().expect("final placement");
        assert_eq!(
            last,
            PosCommand::Place {
                origin: Point::new(800, 600),
                size: SIZE,
                band: ZBand::TopMost,
            }
        );
    }

    #[test]
    fn vanished_window_reports_interrupted_motion() {
        let (ops, clock, id) = setup();
        ops.close_after_frames(id, 3);
        let motion = MotionController::new(&ops, &clock, MotionTiming::default());
        let outcome = motion.animated_move(id, Point::new(0, 0), Point::new(800, 600), SIZE);
        assert_eq!(outcome, Ok(MotionOutcome::Interrupted { frames: 3 }));
        assert_eq!(frames(&ops).len(), 3);
        assert_eq!(places(&ops).len(), 0);
    }
}
