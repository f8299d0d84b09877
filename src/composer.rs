// Message composition: coalesces draft text, staged attachments, a recorded
// voice note, and reply context into one outgoing message for the send
// boundary.

use log::{debug, info};
use tokio::sync::mpsc;

use crate::convo::ConversationEvent;
use crate::media::MediaCaptureController;
use crate::models::{self, DeliveryStatus, Message, RawAttachment, ReplySnapshot, Sender};

/// The outcome of a successful send: the finalized message plus the raw
/// payloads the boundary persists or transmits.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub message: Message,
    pub raw_attachments: Vec<RawAttachment>,
}

#[derive(Default)]
struct Draft {
    text: String,
    reply_to: Option<ReplySnapshot>,
}

pub struct MessageComposer {
    draft: Draft,
    events_tx: mpsc::Sender<ConversationEvent>,
    last_stamp: u64,
}

impl MessageComposer {
    pub fn new(events_tx: mpsc::Sender<ConversationEvent>) -> Self {
        MessageComposer {
            draft: Draft::default(),
            events_tx,
            last_stamp: 0,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.draft.text = text.to_string();
    }

    pub fn text(&self) -> &str {
        &self.draft.text
    }

    /// Append an emoji (or any snippet) to the draft text.
    pub fn insert_emoji(&mut self, emoji: &str) {
        self.draft.text.push_str(emoji);
    }

    /// Remember a value snapshot of the message being replied to. The
    /// original can be deleted later without affecting the snapshot.
    pub fn set_reply_target(&mut self, target: &Message, sender_label: &str) {
        self.draft.reply_to = Some(ReplySnapshot {
            content: target.content.clone(),
            sender_label: sender_label.to_string(),
        });
    }

    pub fn clear_reply_target(&mut self) {
        self.draft.reply_to = None;
    }

    pub fn reply_target(&self) -> Option<&ReplySnapshot> {
        self.draft.reply_to.as_ref()
    }

    /// Send the current draft to `contact_id`. With no text, staged
    /// attachments, or voice note this is a no-op returning `None`;
    /// empty messages are never emitted. Otherwise the draft drains
    /// atomically (text, staging, recording, reply target together) and
    /// one `MessageSent` event fires.
    pub async fn send(
        &mut self,
        contact_id: &str,
        media: &MediaCaptureController,
    ) -> Option<Outgoing> {
        let text = self.draft.text.trim().to_string();
        if text.is_empty() && media.is_empty().await {
            debug!("Ignoring send with no text, attachments, or voice note");
            return None;
        }

        let (attachments, raw_attachments) = media.drain_for_send().await;
        let stamp = self.next_stamp();
        let message = Message {
            id: models::message_id(contact_id, stamp),
            sender: Sender::Me,
            content: text,
            timestamp: stamp,
            status: DeliveryStatus::Sent,
            attachments,
            reply_to: self.draft.reply_to.take(),
            is_starred: false,
        };
        self.draft.text.clear();

        info!(
            "Composed message {} ({} attachments)",
            message.id,
            message.attachments.len()
        );
        let _ = self.events_tx.try_send(ConversationEvent::MessageSent {
            contact_id: contact_id.to_string(),
            message: message.clone(),
            raw_attachments: raw_attachments.clone(),
        });
        Some(Outgoing {
            message,
            raw_attachments,
        })
    }

    /// Discard the draft wholesale: text, reply target, staged attachments,
    /// and any in-progress recording, in one step.
    pub async fn discard(&mut self, media: &MediaCaptureController) {
        self.draft.text.clear();
        self.draft.reply_to = None;
        media.dispose().await;
    }

    // Stamps double as send instants; bumping keeps ids unique and thread
    // order monotonic when two sends land in the same millisecond.
    fn next_stamp(&mut self) -> u64 {
        let stamp = models::now_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp
    }
}
