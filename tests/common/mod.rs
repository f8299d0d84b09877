// Shared helpers for the integration suites.
#![allow(dead_code)]

use log::LevelFilter;
use std::sync::{Arc, Once};
use tokio::sync::mpsc;

use parley::composer::MessageComposer;
use parley::convo::{ConversationEvent, ConversationStore, StatusDelays};
use parley::media::{InMemoryPreviews, MediaCaptureController, SimulatedMicrophone};
use parley::models::{
    message_id, Contact, DeliveryStatus, FileInput, Message, Sender,
};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

pub fn test_contact(id: &str, name: &str, tags: &[&str]) -> Contact {
    Contact {
        id: id.to_string(),
        name: name.to_string(),
        avatar_ref: format!("avatar:{}", id),
        last_message_preview: String::new(),
        last_message_time: 0,
        unread_count: 0,
        online: false,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn test_message(contact_id: &str, stamp: u64, sender: Sender, content: &str) -> Message {
    Message {
        id: message_id(contact_id, stamp),
        sender,
        content: content.to_string(),
        timestamp: stamp,
        status: DeliveryStatus::Sent,
        attachments: Vec::new(),
        reply_to: None,
        is_starred: false,
    }
}

/// A store seeded with alice and ben, default delays.
pub async fn seeded_store() -> (ConversationStore, mpsc::Receiver<ConversationEvent>) {
    let (store, events_rx) = ConversationStore::new();
    store
        .seed_contacts(vec![
            test_contact("alice", "Alice Moreau", &["friends"]),
            test_contact("ben", "Ben Okafor", &["work"]),
        ])
        .await;
    (store, events_rx)
}

pub async fn seeded_store_with_delays(
    delays: StatusDelays,
) -> (ConversationStore, mpsc::Receiver<ConversationEvent>) {
    let (store, events_rx) = ConversationStore::with_delays(delays);
    store
        .seed_contacts(vec![
            test_contact("alice", "Alice Moreau", &["friends"]),
            test_contact("ben", "Ben Okafor", &["work"]),
        ])
        .await;
    (store, events_rx)
}

/// Media controller backed by the simulated microphone and an observable
/// preview allocator.
pub fn test_media() -> (
    MediaCaptureController,
    Arc<InMemoryPreviews>,
    mpsc::Receiver<ConversationEvent>,
) {
    let (events_tx, events_rx) = mpsc::channel(100);
    let previews = Arc::new(InMemoryPreviews::new());
    let media = MediaCaptureController::new(
        Arc::new(SimulatedMicrophone::new()),
        Arc::clone(&previews) as Arc<dyn parley::media::PreviewAllocator>,
        events_tx,
    );
    (media, previews, events_rx)
}

pub fn test_composer() -> (MessageComposer, mpsc::Receiver<ConversationEvent>) {
    let (events_tx, events_rx) = mpsc::channel(100);
    (MessageComposer::new(events_tx), events_rx)
}

pub fn png_file(name: &str) -> FileInput {
    FileInput {
        name: name.to_string(),
        media_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4E, 0x47],
    }
}

pub fn pdf_file(name: &str) -> FileInput {
    FileInput {
        name: name.to_string(),
        media_type: "application/pdf".to_string(),
        bytes: vec![0x25, 0x50, 0x44, 0x46],
    }
}

/// Drain the channel, keeping only status-change events.
pub fn drain_status_events(
    events_rx: &mut mpsc::Receiver<ConversationEvent>,
) -> Vec<(String, DeliveryStatus)> {
    let mut seen = Vec::new();
    while let Ok(event) = events_rx.try_recv() {
        if let ConversationEvent::StatusChanged {
            message_id, status, ..
        } = event
        {
            seen.push((message_id, status));
        }
    }
    seen
}

/// Count the typing signals currently queued on the channel.
pub fn drain_typing_events(events_rx: &mut mpsc::Receiver<ConversationEvent>) -> (usize, usize) {
    let mut started = 0;
    let mut stopped = 0;
    while let Ok(event) = events_rx.try_recv() {
        match event {
            ConversationEvent::TypingStarted => started += 1,
            ConversationEvent::TypingStopped => stopped += 1,
            _ => {}
        }
    }
    (started, stopped)
}
