use serde::{Deserialize, Serialize};

/// A conversation partner shown in the contact pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_ref: String,
    #[serde(default)]
    pub last_message_preview: String,
    #[serde(default)]
    pub last_message_time: u64,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Peer,
}

/// Delivery progression for self-sent messages. Variant order matters:
/// status only ever moves forward through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    /// Milliseconds since the epoch. Thread order follows this.
    pub timestamp: u64,
    /// Meaningful only when `sender` is `Me`.
    pub status: DeliveryStatus,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<ReplySnapshot>,
    pub is_starred: bool,
}

/// Value copy of the message being replied to. The original may be deleted
/// later without invalidating the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplySnapshot {
    pub content: String,
    pub sender_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Document,
    Location,
    ContactCard,
}

impl AttachmentKind {
    /// Classify a declared media type by its primary category. Anything
    /// unrecognized (including malformed type strings) is a document.
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type.split('/').next().unwrap_or("") {
            "image" => AttachmentKind::Image,
            "video" => AttachmentKind::Video,
            "audio" => AttachmentKind::Audio,
            _ => AttachmentKind::Document,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::Audio => "audio",
            AttachmentKind::Document => "document",
            AttachmentKind::Location => "location",
            AttachmentKind::ContactCard => "contact",
        }
    }
}

/// Kind-specific attachment payload, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentMeta {
    Location { latitude: f64, longitude: f64 },
    ContactCard { name: String, phone: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Locally-resolvable resource handle, e.g. a blob-URL style token.
    pub source_ref: String,
    pub display_name: String,
    pub metadata: Option<AttachmentMeta>,
}

/// File-like input handed to the staging API. The engine only reads the
/// media type's primary category and the displayable name.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Raw payload handed back to the send boundary alongside the finalized
/// message; the collaborator behind the boundary persists or transmits it.
#[derive(Debug, Clone)]
pub struct RawAttachment {
    pub display_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory audio blob assembled from captured chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl AudioBlob {
    pub fn concat(chunks: Vec<Vec<u8>>) -> Self {
        AudioBlob {
            mime: "audio/webm".to_string(),
            bytes: chunks.concat(),
        }
    }
}

/// Message ids embed the contact id and the send instant, so id order within
/// a thread follows timestamp order.
pub fn message_id(contact_id: &str, stamp_millis: u64) -> String {
    format!("{}-{}", contact_id, stamp_millis)
}

pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}
