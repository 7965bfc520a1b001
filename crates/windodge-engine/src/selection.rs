//! Selection handoff between the input callback and the orchestrator.
//!
//! The callback side owns a [`SelectionSink`] and judges every click; chosen
//! window ids and a completion marker travel over a bounded channel to the
//! [`SelectionQueue`], which the orchestrator drains once the input loop has
//! stopped.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, info, warn};

use crate::WindowId;

/// Messages sent from the sink to the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SelectionEvent {
    /// A window was chosen.
    Selected(WindowId),
    /// The requested number of windows has been chosen.
    Complete,
}

/// What the sink decided about one click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionVerdict {
    /// No window, or an invisible one, under the cursor.
    NoWindow,
    /// The click landed on the controlling console.
    Console,
    /// The window was already chosen.
    Duplicate,
    /// Window accepted; more are still wanted.
    Accepted {
        /// One-based position in the selection.
        index: usize,
        /// Total windows wanted.
        wanted: usize,
    },
    /// Window accepted and the selection is now complete.
    Complete,
    /// Selection already finished; the click is not ours.
    Closed,
}

impl SelectionVerdict {
    /// True when the click should be swallowed instead of reaching the window.
    pub fn consumes(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::Complete)
    }

    /// True when the input loop should stop.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Producer half, owned by the input callback.
#[derive(Debug)]
pub struct SelectionSink {
    /// Windows wanted.
    wanted: usize,
    /// Console window to refuse, if any.
    console: Option<WindowId>,
    /// Windows accepted so far, in order.
    chosen: Vec<WindowId>,
    /// Channel to the queue.
    tx: Sender<SelectionEvent>,
}

/// Consumer half, owned by the orchestrator.
#[derive(Debug)]
pub struct SelectionQueue {
    /// Windows wanted.
    wanted: usize,
    /// Channel from the sink.
    rx: Receiver<SelectionEvent>,
}

/// Result of draining a [`SelectionQueue`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Chosen windows, in click order.
    pub windows: Vec<WindowId>,
    /// True when the sink signalled completion.
    pub complete: bool,
}

/// Build a connected sink/queue pair for `wanted` windows.
///
/// Clicks on `console` are always refused.
pub fn selection_channel(
    wanted: usize,
    console: Option<WindowId>,
) -> (SelectionSink, SelectionQueue) {
    let wanted = wanted.max(1);
    // One slot per window plus the completion marker; the sink never blocks.
    let (tx, rx) = bounded(wanted + 1);
    (
        SelectionSink {
            wanted,
            console,
            chosen: Vec::with_capacity(wanted),
            tx,
        },
        SelectionQueue { wanted, rx },
    )
}

impl SelectionSink {
    /// Judge a click on `candidate`, the root window under the cursor.
    pub fn offer(&mut self, candidate: Option<WindowId>, visible: bool) -> SelectionVerdict {
        if self.is_complete() {
            return SelectionVerdict::Closed;
        }
        let Some(id) = candidate.filter(|_| visible) else {
            debug!("click on no visible window; ignored");
            return SelectionVerdict::NoWindow;
        };
        if Some(id) == self.console {
            info!("cannot select the console window; click another window");
            return SelectionVerdict::Console;
        }
        if self.chosen.contains(&id) {
            info!(%id, "window already selected; click a different one");
            return SelectionVerdict::Duplicate;
        }

        self.chosen.push(id);
        self.send(SelectionEvent::Selected(id));
        let index = self.chosen.len();
        info!(%id, index, wanted = self.wanted, "window selected");
        if self.is_complete() {
            self.send(SelectionEvent::Complete);
            SelectionVerdict::Complete
        } else {
            SelectionVerdict::Accepted {
                index,
                wanted: self.wanted,
            }
        }
    }

    /// True once `wanted` windows have been accepted.
    pub fn is_complete(&self) -> bool {
        self.chosen.len() >= self.wanted
    }

    /// Forward an event; a vanished queue only means nobody is listening.
    fn send(&self, event: SelectionEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Disconnected(_)) => debug!("selection queue dropped"),
            Err(TrySendError::Full(_)) => warn!(?event, "selection queue full; event dropped"),
        }
    }
}

impl SelectionQueue {
    /// Windows requested.
    pub fn wanted(&self) -> usize {
        self.wanted
    }

    /// Collect everything the sink has sent so far.
    pub fn drain(&self) -> Selection {
        let mut out = Selection::default();
        for event in self.rx.try_iter() {
            match event {
                SelectionEvent::Selected(id) => out.windows.push(id),
                SelectionEvent::Complete => out.complete = true,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONSOLE: WindowId = WindowId(0xC0);

    #[test]
    fn accepts_until_complete() {
        let (mut sink, queue) = selection_channel(2, Some(CONSOLE));
        assert_eq!(
            sink.offer(Some(WindowId(1)), true),
            SelectionVerdict::Accepted {
                index: 1,
                wanted: 2
            }
        );
        assert_eq!(sink.offer(Some(WindowId(2)), true), SelectionVerdict::Complete);
        assert_eq!(sink.offer(Some(WindowId(3)), true), SelectionVerdict::Closed);

        let sel = queue.drain();
        assert!(sel.complete);
        assert_eq!(sel.windows, vec![WindowId(1), WindowId(2)]);
    }

    #[test]
    fn rejects_console_duplicates_and_nothing() {
        let (mut sink, queue) = selection_channel(2, Some(CONSOLE));
        assert_eq!(sink.offer(None, true), SelectionVerdict::NoWindow);
        assert_eq!(sink.offer(Some(WindowId(5)), false), SelectionVerdict::NoWindow);
        assert_eq!(sink.offer(Some(CONSOLE), true), SelectionVerdict::Console);
        assert!(sink.offer(Some(WindowId(5)), true).consumes());
        let dup = sink.offer(Some(WindowId(5)), true);
        assert_eq!(dup, SelectionVerdict::Duplicate);
        assert!(!dup.consumes());

        let sel = queue.drain();
        assert!(!sel.complete);
        assert_eq!(sel.windows, vec![WindowId(5)]);
    }

    #[test]
    fn dropped_queue_does_not_disturb_the_sink() {
        let (mut sink, queue) = selection_channel(1, None);
        drop(queue);
        assert!(sink.offer(Some(WindowId(9)), true).is_complete());
    }

    #[test]
    fn zero_wanted_means_one() {
        let (_, queue) = selection_channel(0, None);
        assert_eq!(queue.wanted(), 1);
    }
}
