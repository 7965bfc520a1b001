//! Session configuration: defaults, an optional RON overlay, and validation.

use std::{fs, path::Path, time::Duration};

use ron::{Options, extensions::Extensions};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    CornerSet, Error, Result,
    adapter::RetryPolicy,
    geom::Size,
    motion::MotionTiming,
    resolve::OverlapResolver,
    sizing::SizingRules,
};

/// Largest number of windows a session will control.
pub const MAX_WINDOWS: usize = 4;

/// Immutable settings for one dodge session.
#[derive(Clone, Debug, PartialEq)]
pub struct DodgeConfig {
    /// Window size as a fraction of the screen, in `(0, 1]`.
    pub size_fraction: f64,
    /// Animation frame rate.
    pub fps: u32,
    /// Animation length.
    pub duration: Duration,
    /// Distance kept from the screen edges, in pixels.
    pub gap: i32,
    /// Corners windows may occupy.
    pub corners: CornerSet,
    /// When false windows keep their size and are only moved.
    pub resize: bool,
    /// Windows to select, `1..=4`.
    pub windows: usize,
    /// Fraction of the screen area above which the session pauses.
    pub pause_threshold: f64,
    /// Delay between poll cycles.
    pub poll: Duration,
    /// Minimum time between two dodges of the same window.
    pub cooldown: Duration,
    /// Overlap depth, in pixels, still considered non-overlapping.
    pub overlap_tolerance: i32,
    /// Retry policy for geometry reads.
    pub retry: RetryPolicy,
    /// Lower bound for either window axis.
    pub min_size: i32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        let timing = MotionTiming::default();
        Self {
            size_fraction: 0.25,
            fps: timing.fps,
            duration: timing.duration,
            gap: 50,
            corners: CornerSet::all(),
            resize: true,
            windows: 1,
            pause_threshold: 0.90,
            poll: Duration::from_millis(20),
            cooldown: Duration::from_millis(200),
            overlap_tolerance: 0,
            retry: RetryPolicy::default(),
            min_size: 100,
        }
    }
}

impl DodgeConfig {
    /// Apply every field set in `raw` on top of `self`.
    pub fn apply(mut self, raw: &RawConfig) -> Result<Self> {
        if let Some(v) = raw.size {
            self.size_fraction = v;
        }
        if let Some(v) = raw.fps {
            self.fps = v;
        }
        if let Some(v) = &raw.duration {
            self.duration = parse_duration("duration", v)?;
        }
        if let Some(v) = raw.gap {
            self.gap = v;
        }
        if let Some(v) = &raw.positions {
            self.corners = CornerSet::from_quadrants(v)?;
        }
        if let Some(v) = raw.no_resize {
            self.resize = !v;
        }
        if let Some(v) = raw.num_windows {
            self.windows = v;
        }
        if let Some(v) = raw.pause_threshold {
            self.pause_threshold = v;
        }
        if let Some(v) = &raw.poll {
            self.poll = parse_duration("poll", v)?;
        }
        if let Some(v) = &raw.cooldown {
            self.cooldown = parse_duration("cooldown", v)?;
        }
        if let Some(v) = raw.overlap_tolerance {
            self.overlap_tolerance = v;
        }
        if let Some(v) = raw.retries {
            self.retry.attempts = v;
        }
        if let Some(v) = &raw.retry_delay {
            self.retry.delay = parse_duration("retry_delay", v)?;
        }
        if let Some(v) = raw.min_size {
            self.min_size = v;
        }
        Ok(self)
    }

    /// Reject out-of-range values. A window count above the number of allowed
    /// corners is legal but logged, since the extra windows cannot all fit.
    pub fn validate(&self) -> Result<()> {
        if !(self.size_fraction > 0.0 && self.size_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "size must be in (0, 1], got {}",
                self.size_fraction
            )));
        }
        if !(self.pause_threshold > 0.0 && self.pause_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "pause threshold must be in (0, 1], got {}",
                self.pause_threshold
            )));
        }
        if !(1..=MAX_WINDOWS).contains(&self.windows) {
            return Err(Error::InvalidConfig(format!(
                "number of windows must be between 1 and {MAX_WINDOWS}, got {}",
                self.windows
            )));
        }
        if self.gap < 0 {
            return Err(Error::InvalidConfig(format!(
                "gap must not be negative, got {}",
                self.gap
            )));
        }
        if self.min_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "minimum window size must be positive, got {}",
                self.min_size
            )));
        }
        if self.overlap_tolerance < 0 {
            return Err(Error::InvalidConfig(format!(
                "overlap tolerance must not be negative, got {}",
                self.overlap_tolerance
            )));
        }
        if self.windows > self.corners.len() {
            warn!(
                windows = self.windows,
                corners = %self.corners,
                "more windows than allowed corners; some windows may not be placed"
            );
        }
        Ok(())
    }

    /// Animation timing.
    pub fn timing(&self) -> MotionTiming {
        MotionTiming {
            duration: self.duration,
            fps: self.fps,
        }
    }

    /// Sizing rules.
    pub fn sizing(&self) -> SizingRules {
        SizingRules {
            fraction: self.size_fraction,
            resize: self.resize,
            min_size: self.min_size,
            gap: self.gap,
        }
    }

    /// Overlap resolver for a screen of `screen` pixels.
    pub fn resolver(&self, screen: Size) -> OverlapResolver {
        OverlapResolver::new(self.corners, screen, self.gap, self.overlap_tolerance)
    }
}

/// Parse a humantime duration string for `field`.
fn parse_duration(field: &str, text: &str) -> Result<Duration> {
    humantime::parse_duration(text)
        .map_err(|e| Error::InvalidConfig(format!("{field}: '{text}': {e}")))
}

/// On-disk configuration overlay. Every field is optional; names mirror the
/// command-line flags.
///
/// ```text
/// (
///     size: 0.3,
///     positions: "12",
///     duration: "150ms",
///     num_windows: 2,
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Window size fraction.
    #[serde(default)]
    pub size: Option<f64>,
    /// Frame rate.
    #[serde(default)]
    pub fps: Option<u32>,
    /// Animation duration, e.g. `"250ms"`.
    #[serde(default)]
    pub duration: Option<String>,
    /// Edge gap in pixels.
    #[serde(default)]
    pub gap: Option<i32>,
    /// Corner digits, e.g. `"1234"`.
    #[serde(default)]
    pub positions: Option<String>,
    /// Disable resizing.
    #[serde(default)]
    pub no_resize: Option<bool>,
    /// Windows to select.
    #[serde(default)]
    pub num_windows: Option<usize>,
    /// Pause threshold.
    #[serde(default)]
    pub pause_threshold: Option<f64>,
    /// Poll interval.
    #[serde(default)]
    pub poll: Option<String>,
    /// Per-window cooldown.
    #[serde(default)]
    pub cooldown: Option<String>,
    /// Overlap tolerance in pixels.
    #[serde(default)]
    pub overlap_tolerance: Option<i32>,
    /// Geometry read attempts.
    #[serde(default)]
    pub retries: Option<u32>,
    /// Delay between geometry read attempts.
    #[serde(default)]
    pub retry_delay: Option<String>,
    /// Minimum window size.
    #[serde(default)]
    pub min_size: Option<i32>,
}

impl RawConfig {
    /// Parse RON text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
            .map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Overlay `other` on `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            size: other.size.or(self.size),
            fps: other.fps.or(self.fps),
            duration: other.duration.or(self.duration),
            gap: other.gap.or(self.gap),
            positions: other.positions.or(self.positions),
            no_resize: other.no_resize.or(self.no_resize),
            num_windows: other.num_windows.or(self.num_windows),
            pause_threshold: other.pause_threshold.or(self.pause_threshold),
            poll: other.poll.or(self.poll),
            cooldown: other.cooldown.or(self.cooldown),
            overlap_tolerance: other.overlap_tolerance.or(self.overlap_tolerance),
            retries: other.retries.or(self.retries),
            retry_delay: other.retry_delay.or(self.retry_delay),
            min_size: other.min_size.or(self.min_size),
        }
    }

    /// Resolve against the defaults and validate.
    pub fn resolve(&self) -> Result<DodgeConfig> {
        let config = DodgeConfig::default().apply(self)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::Corner;

    fn parse(text: &str) -> Result<RawConfig> {
        RawConfig::parse(text, Path::new("test.ron"))
    }

    #[test]
    fn defaults_are_valid() {
        let c = DodgeConfig::default();
        c.validate().expect("valid");
        assert_eq!(c.timing().frame_count(), 15);
        assert_eq!(c.corners.len(), 4);
        assert_eq!(c.retry.attempts, 5);
    }

    #[test]
    fn overlay_from_ron() {
        let raw = parse(r#"(size: 0.3, positions: "21", duration: "150ms", num_windows: 2)"#)
            .expect("parse");
        let c = raw.resolve().expect("resolve");
        assert_eq!(c.size_fraction, 0.3);
        assert_eq!(c.duration, Duration::from_millis(150));
        assert_eq!(c.windows, 2);
        assert!(c.corners.contains(Corner::TopLeft));
        assert!(c.corners.contains(Corner::TopRight));
        assert!(!c.corners.contains(Corner::BottomLeft));
        assert_eq!(c.fps, 60);
    }

    #[test]
    fn later_layer_wins() {
        let file = parse(r#"(gap: 10, fps: 30)"#).expect("parse");
        let cli = RawConfig {
            gap: Some(80),
            ..RawConfig::default()
        };
        let c = file.merge(cli).resolve().expect("resolve");
        assert_eq!(c.gap, 80);
        assert_eq!(c.fps, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse("(colour: 3)").expect_err("unknown field");
        assert!(matches!(err, Error::ConfigParse { path, .. } if path == PathBuf::from("test.ron")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for text in [
            "(size: 0.0)",
            "(size: 1.5)",
            "(pause_threshold: 0.0)",
            "(num_windows: 0)",
            "(num_windows: 5)",
            "(gap: -1)",
            "(min_size: 0)",
        ] {
            let raw = parse(text).expect("parse");
            assert!(
                matches!(raw.resolve(), Err(Error::InvalidConfig(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn bad_positions_and_durations() {
        let raw = parse(r#"(positions: "15")"#).expect("parse");
        assert_eq!(raw.resolve(), Err(Error::InvalidCorner('5')));
        let raw = parse(r#"(positions: "")"#).expect("parse");
        assert_eq!(raw.resolve(), Err(Error::EmptyCornerSet));
        let raw = parse(r#"(cooldown: "soon")"#).expect("parse");
        assert!(matches!(raw.resolve(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = RawConfig::load(Path::new("/nonexistent/windodge.ron")).expect_err("missing");
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
