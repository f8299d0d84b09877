// Media capture for the composer: file staging with typed previews and the
// voice-note recorder.

pub mod capture;
pub mod preview;
mod recorder;

pub use capture::{AudioCapture, CaptureError, MicHandle, MicStream, SimulatedMicrophone};
pub use preview::{InMemoryPreviews, PreviewAllocator, PreviewHandle};

use log::debug;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::task::JoinHandle;

use crate::convo::ConversationEvent;
use crate::models::{
    Attachment, AttachmentKind, AttachmentMeta, AudioBlob, FileInput, RawAttachment,
};

/// Recording stops on its own once this much time has elapsed.
pub const MAX_RECORDING_SECS: u64 = 60;

/// An attachment captured into the draft but not yet part of a sent message.
#[derive(Debug, Clone)]
pub struct StagedAttachment {
    pub kind: AttachmentKind,
    pub display_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub preview: Option<PreviewHandle>,
    pub metadata: Option<AttachmentMeta>,
}

pub(crate) enum RecorderState {
    Idle,
    Recording {
        handle: MicHandle,
        chunks: Vec<Vec<u8>>,
        elapsed_secs: u64,
        tick: Option<JoinHandle<()>>,
    },
}

pub(crate) struct MediaInner {
    pub(crate) staged: Vec<StagedAttachment>,
    pub(crate) recorder: RecorderState,
    pub(crate) voice_note: Option<AudioBlob>,
}

/// Owns attachment staging and the voice-recording lifecycle for one
/// composer session.
pub struct MediaCaptureController {
    pub(crate) inner: Arc<TokioMutex<MediaInner>>,
    pub(crate) capture: Arc<dyn AudioCapture>,
    pub(crate) previews: Arc<dyn PreviewAllocator>,
    pub(crate) events_tx: mpsc::Sender<ConversationEvent>,
}

impl MediaCaptureController {
    pub fn new(
        capture: Arc<dyn AudioCapture>,
        previews: Arc<dyn PreviewAllocator>,
        events_tx: mpsc::Sender<ConversationEvent>,
    ) -> Self {
        MediaCaptureController {
            inner: Arc::new(TokioMutex::new(MediaInner {
                staged: Vec::new(),
                recorder: RecorderState::Idle,
                voice_note: None,
            })),
            capture,
            previews,
            events_tx,
        }
    }

    /// Stage a batch of files, classifying each by the primary category of
    /// its declared media type. Images get a preview handle; anything
    /// unrecognized stages as a document. Returns the updated staged
    /// sequence.
    pub async fn stage_files(&self, files: Vec<FileInput>) -> Vec<StagedAttachment> {
        let mut inner = self.inner.lock().await;
        for file in files {
            let kind = AttachmentKind::from_media_type(&file.media_type);
            let preview = match kind {
                AttachmentKind::Image => Some(self.previews.create_from_blob(&file.bytes)),
                _ => None,
            };
            debug!("Staged {} attachment '{}'", kind.label(), file.name);
            inner.staged.push(StagedAttachment {
                kind,
                display_name: file.name,
                media_type: file.media_type,
                bytes: file.bytes,
                preview,
                metadata: None,
            });
        }
        inner.staged.clone()
    }

    /// Stage a location pin from the attachment menu.
    pub async fn stage_location(&self, latitude: f64, longitude: f64) {
        let mut inner = self.inner.lock().await;
        inner.staged.push(StagedAttachment {
            kind: AttachmentKind::Location,
            display_name: format!("Location {:.4}, {:.4}", latitude, longitude),
            media_type: "application/geo".to_string(),
            bytes: Vec::new(),
            preview: None,
            metadata: Some(AttachmentMeta::Location {
                latitude,
                longitude,
            }),
        });
    }

    /// Stage a contact card from the attachment menu.
    pub async fn stage_contact_card(&self, name: &str, phone: &str) {
        let mut inner = self.inner.lock().await;
        inner.staged.push(StagedAttachment {
            kind: AttachmentKind::ContactCard,
            display_name: name.to_string(),
            media_type: "text/vcard".to_string(),
            bytes: Vec::new(),
            preview: None,
            metadata: Some(AttachmentMeta::ContactCard {
                name: name.to_string(),
                phone: phone.to_string(),
            }),
        });
    }

    /// Remove the staged attachment at `index`, revoking its preview if it
    /// owned one. Out of range is a defined no-op.
    pub async fn unstage(&self, index: usize) {
        let mut inner = self.inner.lock().await;
        if index >= inner.staged.len() {
            debug!("Ignoring unstage of out-of-range index {}", index);
            return;
        }
        let removed = inner.staged.remove(index);
        if let Some(preview) = removed.preview {
            self.previews.revoke(&preview);
        }
    }

    /// Kind and display name of each staged attachment, in user order.
    pub async fn staged_labels(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .staged
            .iter()
            .map(|s| format!("[{}] {}", s.kind.label(), s.display_name))
            .collect()
    }

    pub async fn staged_len(&self) -> usize {
        self.inner.lock().await.staged.len()
    }

    /// True when there is nothing to send: no staged attachments and no
    /// staged voice note.
    pub async fn is_empty(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.staged.is_empty() && inner.voice_note.is_none()
    }

    pub async fn voice_note_pending(&self) -> bool {
        self.inner.lock().await.voice_note.is_some()
    }

    /// Drop the staged voice note.
    pub async fn discard_recording(&self) {
        let mut inner = self.inner.lock().await;
        if inner.voice_note.take().is_some() {
            debug!("Discarded staged voice note");
        }
    }

    /// Convert everything staged into message attachments plus the raw
    /// payloads for the send boundary, in the user's attachment order; a
    /// pending voice note goes last. Image previews transfer to the sent
    /// attachment's `source_ref` without being revoked.
    pub(crate) async fn drain_for_send(&self) -> (Vec<Attachment>, Vec<RawAttachment>) {
        let mut inner = self.inner.lock().await;
        let mut attachments = Vec::new();
        let mut raw = Vec::new();
        for staged in inner.staged.drain(..) {
            let source_ref = match (&staged.preview, &staged.metadata) {
                (Some(preview), _) => preview.0.clone(),
                (None, Some(AttachmentMeta::Location {
                    latitude,
                    longitude,
                })) => format!("geo:{},{}", latitude, longitude),
                (None, Some(AttachmentMeta::ContactCard { name, .. })) => {
                    format!("card:{}", name)
                }
                (None, None) => self.previews.create_from_blob(&staged.bytes).0,
            };
            attachments.push(Attachment {
                kind: staged.kind,
                source_ref,
                display_name: staged.display_name.clone(),
                metadata: staged.metadata,
            });
            raw.push(RawAttachment {
                display_name: staged.display_name,
                media_type: staged.media_type,
                bytes: staged.bytes,
            });
        }
        if let Some(blob) = inner.voice_note.take() {
            let name = format!("voice-message-{}.webm", crate::models::now_millis());
            let source_ref = self.previews.create_from_blob(&blob.bytes).0;
            attachments.push(Attachment {
                kind: AttachmentKind::Audio,
                source_ref,
                display_name: name.clone(),
                metadata: None,
            });
            raw.push(RawAttachment {
                display_name: name,
                media_type: blob.mime,
                bytes: blob.bytes,
            });
        }
        (attachments, raw)
    }

    /// Tear the controller down: abort any in-progress recording without
    /// staging it, release every staged preview, and clear staging.
    pub async fn dispose(&self) {
        self.cancel_recording().await;
        let mut inner = self.inner.lock().await;
        for staged in inner.staged.drain(..) {
            if let Some(preview) = staged.preview {
                self.previews.revoke(&preview);
            }
        }
        inner.voice_note = None;
    }
}
