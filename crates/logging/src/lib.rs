#![warn(missing_docs)]

//! Shared logging controls for the windodge workspace.
//!
//! Binaries flatten [`LogArgs`] into their CLI and call [`LogArgs::init`].
//! Level flags only raise or lower *our* crates; dependencies stay at their
//! `EnvFilter` default.

use std::{env, str::FromStr};

use clap::Args;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*, registry};

/// Targets that count as windodge's own logs.
pub const CRATES: &[&str] = &["windodge", "windodge_engine", "win_winops", "logging"];

/// Log verbosity flags.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Trace-level logs from windodge crates
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Debug-level logs from windodge crates
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Log level for windodge crates: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", value_parser = LevelFilter::from_str)]
    pub log_level: Option<LevelFilter>,

    /// Raw tracing filter, e.g. "windodge_engine=trace,win_winops=debug"; wins over everything
    #[arg(long, value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,
}

/// Directives setting every crate in [`CRATES`] to `level`.
pub fn scoped(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl LogArgs {
    /// Level requested by the flags, if any.
    fn flag_level(&self) -> Option<LevelFilter> {
        if self.trace {
            Some(LevelFilter::TRACE)
        } else if self.debug {
            Some(LevelFilter::DEBUG)
        } else {
            self.log_level
        }
    }

    /// Filter directives given `rust_log`, the value of `RUST_LOG`.
    ///
    /// Order: `--log-filter`, then the level flags, then `rust_log`, then
    /// `info` for our crates.
    pub fn resolve(&self, rust_log: Option<String>) -> String {
        if let Some(filter) = &self.log_filter {
            return filter.clone();
        }
        match (self.flag_level(), rust_log) {
            (Some(level), _) => scoped(level),
            (None, Some(env)) if !env.trim().is_empty() => env,
            (None, _) => scoped(LevelFilter::INFO),
        }
    }

    /// Filter directives for this process.
    pub fn filter_spec(&self) -> String {
        self.resolve(env::var("RUST_LOG").ok())
    }

    /// Install the global subscriber: env filter plus a compact fmt layer
    /// without timestamps. Returns `false` if one was already installed.
    ///
    /// Unparseable directives fall back to `info` for our crates.
    pub fn init(&self) -> bool {
        let spec = self.filter_spec();
        let filter = EnvFilter::try_new(&spec).unwrap_or_else(|err| {
            eprintln!("ignoring log filter {spec:?}: {err}");
            EnvFilter::new(scoped(LevelFilter::INFO))
        });
        registry()
            .with(filter)
            .with(fmt::layer().without_time().with_target(false))
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_names_every_crate() {
        let spec = scoped(LevelFilter::DEBUG);
        assert_eq!(spec.split(',').count(), CRATES.len());
        assert!(spec.contains("win_winops=debug"));
    }

    #[test]
    fn raw_filter_beats_flags_and_env() {
        let args = LogArgs {
            log_filter: Some("windodge=trace".into()),
            log_level: Some(LevelFilter::WARN),
            ..LogArgs::default()
        };
        assert_eq!(args.resolve(Some("off".into())), "windodge=trace");
    }

    #[test]
    fn flags_beat_env() {
        let trace = LogArgs {
            trace: true,
            ..LogArgs::default()
        };
        assert_eq!(trace.resolve(Some("off".into())), scoped(LevelFilter::TRACE));
        let level = LogArgs {
            log_level: Some(LevelFilter::ERROR),
            ..LogArgs::default()
        };
        assert_eq!(level.resolve(None), scoped(LevelFilter::ERROR));
    }

    #[test]
    fn env_then_default() {
        let none = LogArgs::default();
        assert_eq!(none.resolve(Some("debug".into())), "debug");
        assert_eq!(none.resolve(Some("  ".into())), scoped(LevelFilter::INFO));
        assert_eq!(none.resolve(None), scoped(LevelFilter::INFO));
    }
}
