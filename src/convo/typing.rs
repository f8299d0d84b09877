// Typing-indicator debounce: bursty keystrokes in, discrete started/stopped
// signals out.

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::ConversationEvent;

/// Keystroke quiet period after which typing counts as stopped.
pub const TYPING_QUIET_PERIOD: Duration = Duration::from_secs(1);

/// Debounces keystroke activity into `TypingStarted` / `TypingStopped`
/// events. One instance per composer session; `dispose` (also run on drop)
/// cancels the pending quiet timer so no stale stop fires afterwards.
pub struct TypingIndicatorTimer {
    events_tx: mpsc::Sender<ConversationEvent>,
    quiet_period: Duration,
    pending_stop: Option<JoinHandle<()>>,
    disposed: bool,
}

impl TypingIndicatorTimer {
    pub fn new(events_tx: mpsc::Sender<ConversationEvent>) -> Self {
        Self::with_quiet_period(events_tx, TYPING_QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        events_tx: mpsc::Sender<ConversationEvent>,
        quiet_period: Duration,
    ) -> Self {
        TypingIndicatorTimer {
            events_tx,
            quiet_period,
            pending_stop: None,
            disposed: false,
        }
    }

    /// Record one keystroke. Emits `TypingStarted` immediately, on every
    /// call (collaborators wanting burst-start-only semantics debounce on
    /// their side), and re-arms the single-shot quiet timer.
    pub fn on_activity(&mut self) {
        if self.disposed {
            debug!("Ignoring typing activity after dispose");
            return;
        }
        let _ = self.events_tx.try_send(ConversationEvent::TypingStarted);
        if let Some(pending) = self.pending_stop.take() {
            pending.abort();
        }
        let events_tx = self.events_tx.clone();
        let quiet = self.quiet_period;
        self.pending_stop = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = events_tx.send(ConversationEvent::TypingStopped).await;
        }));
    }

    /// Cancel any pending quiet timer. No `TypingStopped` fires after this
    /// returns.
    pub fn dispose(&mut self) {
        if let Some(pending) = self.pending_stop.take() {
            pending.abort();
        }
        self.disposed = true;
    }
}

impl Drop for TypingIndicatorTimer {
    fn drop(&mut self) {
        self.dispose();
    }
}
