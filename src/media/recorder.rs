// Voice-recorder state machine: Idle -> Recording -> Idle, either by an
// explicit stop or by the hard ceiling, which stops the session exactly as
// if end_recording had been called.

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::Duration;

use super::{MediaCaptureController, MediaInner, RecorderState, MAX_RECORDING_SECS};
use crate::convo::ConversationEvent;
use crate::media::capture::{AudioCapture, CaptureError};
use crate::models::AudioBlob;

impl MediaCaptureController {
    /// Start a voice recording. Fails with `CapabilityUnavailable` when the
    /// microphone cannot be acquired, leaving the recorder idle with no
    /// partial state. Calling while already recording is a no-op.
    pub async fn begin_recording(&self) -> Result<(), CaptureError> {
        {
            let inner = self.inner.lock().await;
            if matches!(inner.recorder, RecorderState::Recording { .. }) {
                debug!("Ignoring begin_recording while a session is active");
                return Ok(());
            }
        }

        // Acquisition is awaited without holding the lock, so the rest of
        // the composer stays usable while the request is pending.
        let stream = self.capture.acquire_microphone().await?;
        let handle = self.capture.start_capture(stream);

        let mut inner = self.inner.lock().await;
        if matches!(inner.recorder, RecorderState::Recording { .. }) {
            // A concurrent begin won the race; give the extra session back.
            self.capture.stop_capture(handle);
            return Ok(());
        }
        inner.recorder = RecorderState::Recording {
            handle,
            chunks: Vec::new(),
            elapsed_secs: 0,
            tick: None,
        };
        let tick = self.spawn_tick_task();
        if let RecorderState::Recording { tick: slot, .. } = &mut inner.recorder {
            *slot = Some(tick);
        }
        info!("Recording started");
        Ok(())
    }

    fn spawn_tick_task(&self) -> tokio::task::JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let capture = Arc::clone(&self.capture);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.tick().await; // the first tick resolves immediately
            loop {
                ticker.tick().await;
                let mut guard = inner.lock().await;
                let secs = match &mut guard.recorder {
                    RecorderState::Recording {
                        handle,
                        chunks,
                        elapsed_secs,
                        ..
                    } => {
                        if let Some(chunk) = capture.poll_chunk(handle) {
                            chunks.push(chunk);
                        }
                        *elapsed_secs += 1;
                        *elapsed_secs
                    }
                    RecorderState::Idle => break,
                };
                let _ = events_tx.try_send(ConversationEvent::RecordingTick { seconds: secs });
                if secs >= MAX_RECORDING_SECS {
                    info!("Recording hit the {}s ceiling, stopping", MAX_RECORDING_SECS);
                    Self::finalize(&mut guard, capture.as_ref());
                    break;
                }
            }
        })
    }

    /// Stop the active recording and stage the accumulated audio as one
    /// voice-note blob. A no-op while idle.
    pub async fn end_recording(&self) {
        let mut inner = self.inner.lock().await;
        if matches!(inner.recorder, RecorderState::Recording { .. }) {
            Self::finalize(&mut inner, self.capture.as_ref());
        } else {
            debug!("Ignoring end_recording while idle");
        }
    }

    /// Abort the active recording without staging anything.
    pub(crate) async fn cancel_recording(&self) {
        let mut inner = self.inner.lock().await;
        let state = std::mem::replace(&mut inner.recorder, RecorderState::Idle);
        if let RecorderState::Recording { handle, tick, .. } = state {
            if let Some(tick) = tick {
                tick.abort();
            }
            self.capture.stop_capture(handle);
            warn!("Recording aborted, captured audio dropped");
        }
    }

    /// Seconds recorded so far, or None while idle.
    pub async fn elapsed_secs(&self) -> Option<u64> {
        match self.inner.lock().await.recorder {
            RecorderState::Recording { elapsed_secs, .. } => Some(elapsed_secs),
            RecorderState::Idle => None,
        }
    }

    pub async fn is_recording(&self) -> bool {
        matches!(
            self.inner.lock().await.recorder,
            RecorderState::Recording { .. }
        )
    }

    fn finalize(inner: &mut MediaInner, capture: &dyn AudioCapture) {
        let state = std::mem::replace(&mut inner.recorder, RecorderState::Idle);
        if let RecorderState::Recording {
            handle,
            chunks,
            elapsed_secs,
            tick,
        } = state
        {
            if let Some(tick) = tick {
                tick.abort();
            }
            capture.stop_capture(handle);
            inner.voice_note = Some(AudioBlob::concat(chunks));
            info!("Recording stopped after {}s, voice note staged", elapsed_secs);
        }
    }
}
