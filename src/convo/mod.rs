// Conversation state engine: contacts, per-contact message threads, and the
// simulated delivery-status progression.

pub mod roster;
pub mod status;
pub mod typing;

pub use status::StatusDelays;
pub use typing::TypingIndicatorTimer;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::task::JoinHandle;

use crate::models::{Contact, DeliveryStatus, Message, RawAttachment};

/// Events surfaced to the console (and any other collaborator) over the
/// channel handed out by `ConversationStore::new`.
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// Fired once per successful `MessageComposer::send`.
    MessageSent {
        contact_id: String,
        message: Message,
        raw_attachments: Vec<RawAttachment>,
    },
    /// Fired by the status scheduler on each transition.
    StatusChanged {
        contact_id: String,
        message_id: String,
        status: DeliveryStatus,
    },
    TypingStarted,
    TypingStopped,
    /// Elapsed-seconds feed while a voice recording is active.
    RecordingTick { seconds: u64 },
}

pub(crate) struct StoreInner {
    pub(crate) contacts: Vec<Contact>,
    pub(crate) threads: HashMap<String, Vec<Message>>,
    pub(crate) active_contact: Option<String>,
}

/// Authoritative per-session conversation state.
pub struct ConversationStore {
    pub(crate) inner: Arc<TokioMutex<StoreInner>>,
    pub(crate) events_tx: mpsc::Sender<ConversationEvent>,
    pub(crate) delays: StatusDelays,
    // Pending progression tasks keyed by message id, so a delete can
    // invalidate deferred work without literal cancellation support.
    pub(crate) progressions: Arc<TokioMutex<HashMap<String, JoinHandle<()>>>>,
}

impl ConversationStore {
    pub fn new() -> (Self, mpsc::Receiver<ConversationEvent>) {
        Self::with_delays(StatusDelays::default())
    }

    pub fn with_delays(delays: StatusDelays) -> (Self, mpsc::Receiver<ConversationEvent>) {
        let (events_tx, events_rx) = mpsc::channel(100);
        (
            ConversationStore {
                inner: Arc::new(TokioMutex::new(StoreInner {
                    contacts: Vec::new(),
                    threads: HashMap::new(),
                    active_contact: None,
                })),
                events_tx,
                delays,
                progressions: Arc::new(TokioMutex::new(HashMap::new())),
            },
            events_rx,
        )
    }

    /// A clone of the event sender, for the composer and media components
    /// that share the channel.
    pub fn event_sender(&self) -> mpsc::Sender<ConversationEvent> {
        self.events_tx.clone()
    }

    /// Snapshot of one contact's thread, in append order.
    pub async fn get_thread(&self, contact_id: &str) -> Vec<Message> {
        let inner = self.inner.lock().await;
        inner.threads.get(contact_id).cloned().unwrap_or_default()
    }

    pub async fn active_contact(&self) -> Option<String> {
        self.inner.lock().await.active_contact.clone()
    }

    /// Replace-by-copy mutation of one contact's sequence. Scheduled
    /// callbacks never observe a torn intermediate thread.
    pub(crate) fn replace_thread<F>(inner: &mut StoreInner, contact_id: &str, mutate: F)
    where
        F: FnOnce(&mut Vec<Message>),
    {
        let mut thread = inner.threads.get(contact_id).cloned().unwrap_or_default();
        mutate(&mut thread);
        inner.threads.insert(contact_id.to_string(), thread);
    }
}
