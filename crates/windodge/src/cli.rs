//! Command-line interface definitions for windodge.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use logging::LogArgs;
use windodge_engine::{DodgeConfig, RawConfig, config::MAX_WINDOWS};

use crate::error::Result;

/// Command-line interface for the `windodge` binary.
///
/// Unset flags fall through to the config file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(
    name = "windodge",
    about = "Pin windows to screen corners and move them out of the mouse cursor's way",
    version
)]
pub struct Cli {
    /// Logging controls shared across windodge binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Window size as a fraction of the screen, in (0, 1] [default: 0.25]
    #[arg(long, value_name = "FRACTION")]
    pub size: Option<f64>,

    /// Animation frame rate [default: 60]
    #[arg(long)]
    pub fps: Option<u32>,

    /// Gap between windows and the screen edges, in pixels [default: 50]
    #[arg(long, value_name = "PIXELS")]
    pub gap: Option<i32>,

    /// Allowed corners: 1 top-right, 2 top-left, 3 bottom-left, 4 bottom-right [default: 1234]
    #[arg(long, value_name = "DIGITS")]
    pub positions: Option<String>,

    /// Keep each window's original size instead of resizing it
    #[arg(short = 'N', long)]
    pub no_resize: bool,

    /// Number of windows to select [default: 1]
    #[arg(
        short = 'n',
        long,
        value_parser = clap::value_parser!(u8).range(1..=MAX_WINDOWS as i64)
    )]
    pub num_windows: Option<u8>,

    /// Pause dodging while any window covers more than this screen fraction [default: 0.9]
    #[arg(long, value_name = "FRACTION")]
    pub pause_threshold: Option<f64>,

    /// Duration of each dodge animation [default: 250ms]
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub duration: Option<Duration>,

    /// Minimum time between two moves of the same window [default: 200ms]
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub cooldown: Option<Duration>,

    /// Cursor poll interval [default: 20ms]
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub poll: Option<Duration>,

    /// Optional RON configuration file; flags override its values.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The flags that were given, as a config layer.
    pub fn overlay(&self) -> RawConfig {
        let dur = |d: Option<Duration>| d.map(|d| humantime::format_duration(d).to_string());
        RawConfig {
            size: self.size,
            fps: self.fps,
            duration: dur(self.duration),
            gap: self.gap,
            positions: self.positions.clone(),
            no_resize: self.no_resize.then_some(true),
            num_windows: self.num_windows.map(usize::from),
            pause_threshold: self.pause_threshold,
            poll: dur(self.poll),
            cooldown: dur(self.cooldown),
            ..RawConfig::default()
        }
    }

    /// Defaults, then the config file, then flags; validated.
    pub fn resolve_config(&self) -> Result<DodgeConfig> {
        let file = match &self.config {
            Some(path) => RawConfig::load(path)?,
            None => RawConfig::default(),
        };
        Ok(file.merge(self.overlay()).resolve()?)
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use clap::error::ErrorKind;
    use windodge_engine::{Corner, Error as EngineError};

    use super::*;
    use crate::error::Error;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(iter::once("windodge").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn no_flags_resolve_to_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.overlay(), RawConfig::default());
        assert_eq!(cli.resolve_config().expect("config"), DodgeConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--size", "0.3", "--positions", "21", "-N", "-n", "2", "--duration", "100ms",
            "--cooldown", "1s",
        ]);
        let c = cli.resolve_config().expect("config");
        assert!((c.size_fraction - 0.3).abs() < f64::EPSILON);
        assert!(!c.resize);
        assert_eq!(c.windows, 2);
        assert_eq!(c.duration, Duration::from_millis(100));
        assert_eq!(c.cooldown, Duration::from_secs(1));
        assert_eq!(c.corners.len(), 2);
        assert!(c.corners.contains(Corner::TopRight) && c.corners.contains(Corner::TopLeft));
    }

    #[test]
    fn window_count_is_bounded() {
        let err = Cli::try_parse_from(["windodge", "-n", "5"]).expect_err("out of range");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["windodge", "--num-windows", "0"]).is_err());
    }

    #[test]
    fn bad_positions_fail_before_anything_runs() {
        let err = parse(&["--positions", "15"])
            .resolve_config()
            .expect_err("invalid");
        assert!(matches!(err, Error::Engine(EngineError::InvalidCorner('5'))));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = parse(&["--config", "/nonexistent/windodge.ron"])
            .resolve_config()
            .expect_err("missing");
        assert!(matches!(err, Error::Engine(EngineError::ConfigRead { .. })));
    }

    #[test]
    fn log_flags_are_shared() {
        let cli = parse(&["--debug"]);
        assert!(cli.log.debug);
        assert!(cli.log.filter_spec().contains("windodge_engine=debug"));
    }
}
