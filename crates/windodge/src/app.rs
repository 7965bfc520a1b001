//! Startup sequence and the interrupt-aware dodge loop.

use tokio::{runtime::Builder, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use windodge_engine::{DodgeConfig, RunOutcome, Session, geom::Size};

use crate::error::Result;

/// Log the effective configuration before selection starts.
fn banner(config: &DodgeConfig, screen: Size) {
    info!(
        %screen,
        size = config.size_fraction,
        fps = config.fps,
        duration = %humantime::format_duration(config.duration),
        gap = config.gap,
        resize = config.resize,
        windows = config.windows,
        "windodge starting"
    );
    info!(corners = %config.corners, "active corners");
}

/// Cancel `cancel` on Ctrl-C.
async fn watch_interrupt(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("interrupt received; releasing windows");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
    }
}

/// Drive `session` until every window is gone or `cancel` fires.
///
/// A single-worker runtime hosts the interrupt watcher; the loop itself runs
/// on the calling thread. Windows are released on every exit path.
pub fn run_session(session: &mut Session, cancel: &CancellationToken) -> Result<RunOutcome> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let watcher = runtime.spawn(watch_interrupt(cancel.clone()));
    let outcome = session.run(cancel);
    watcher.abort();
    Ok(outcome?)
}

/// Select windows with the mouse and dodge until interrupted.
#[cfg(windows)]
pub fn launch(config: &DodgeConfig) -> Result<()> {
    use std::sync::Arc;

    use win_winops::Win32Ops;
    use windodge_engine::{clock::SystemClock, ops::WinOps};

    if let Err(e) = win_winops::enable_per_monitor_dpi() {
        warn!(error = %e, "per-monitor DPI awareness unavailable; coordinates may be scaled");
    }
    let ops = Win32Ops::new();
    banner(config, ops.screen_size());

    let selected = win_winops::select_windows(config.windows)?;
    let mut session = Session::initialize(
        Arc::new(ops),
        Arc::new(SystemClock),
        config.clone(),
        &selected,
    )?;
    let outcome = run_session(&mut session, &CancellationToken::new())?;
    info!(?outcome, "stopped");
    Ok(())
}

/// No window-manager backend on this OS.
#[cfg(not(windows))]
pub fn launch(config: &DodgeConfig) -> Result<()> {
    use std::env;

    use crate::error::Error;

    banner(config, Size::new(0, 0));
    Err(Error::UnsupportedPlatform(env::consts::OS))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use windodge_engine::{
        geom::Rect,
        mock::{ManualClock, MockWinOps, MockWindow},
    };

    use super::*;

    fn session(ops: &MockWinOps) -> Session {
        let id = ops.add_window(MockWindow::new(Rect::new(100, 100, 1700, 1000)));
        Session::initialize(
            Arc::new(ops.clone()),
            Arc::new(ManualClock::new()),
            DodgeConfig::default(),
            &[id],
        )
        .expect("session")
    }

    #[test]
    fn cancelled_run_releases_windows() {
        let ops = MockWinOps::new(Size::new(1920, 1080));
        let mut s = session(&ops);
        let id = s.windows()[0].id();
        assert!(ops.is_topmost(id));

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(run_session(&mut s, &cancel).expect("run"), RunOutcome::Cancelled);
        assert!(!ops.is_topmost(id));
    }

    #[test]
    fn run_finishes_when_windows_close() {
        let ops = MockWinOps::new(Size::new(1920, 1080));
        let mut s = session(&ops);
        ops.close(s.windows()[0].id());
        assert_eq!(
            run_session(&mut s, &CancellationToken::new()).expect("run"),
            RunOutcome::Finished
        );
    }
}
