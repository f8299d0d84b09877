// Simulated delivery-status progression.
// Self-sent messages move Sent -> Delivered -> Read on fixed delays, the
// stand-in for real receipt round-trips.

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::time::Duration;

use super::{ConversationEvent, ConversationStore, StoreInner};
use crate::models::{DeliveryStatus, Message, Sender};

/// Fixed delays for the simulated receipt progression.
#[derive(Debug, Clone, Copy)]
pub struct StatusDelays {
    /// Append -> Delivered.
    pub delivered: Duration,
    /// Delivered -> Read.
    pub read: Duration,
}

impl Default for StatusDelays {
    fn default() -> Self {
        StatusDelays {
            delivered: Duration::from_secs(1),
            read: Duration::from_secs(2),
        }
    }
}

impl ConversationStore {
    /// Append a message to a contact's thread in call order (timestamp
    /// validation is the caller's concern), update the contact summary,
    /// and, for self-sent messages only, schedule the status progression.
    pub async fn append_message(&self, contact_id: &str, message: Message) {
        let is_self = message.sender == Sender::Me;
        let message_id = message.id.clone();
        {
            let mut inner = self.inner.lock().await;
            if !inner.contacts.iter().any(|c| c.id == contact_id) {
                warn!("Dropping message for unknown contact {}", contact_id);
                return;
            }
            let active = inner.active_contact.clone();
            if let Some(contact) = inner.contacts.iter_mut().find(|c| c.id == contact_id) {
                contact.last_message_preview = message.content.clone();
                contact.last_message_time = message.timestamp;
                if message.sender == Sender::Peer && active.as_deref() != Some(contact_id) {
                    contact.unread_count += 1;
                }
            }
            Self::replace_thread(&mut inner, contact_id, move |thread| thread.push(message));
        }
        if is_self {
            self.schedule_progression(contact_id, &message_id).await;
        }
    }

    /// Remove a message. Its pending progression task is invalidated; any
    /// transition already in flight becomes a no-op.
    pub async fn delete_message(&self, contact_id: &str, message_id: &str) {
        {
            let mut inner = self.inner.lock().await;
            let exists = inner
                .threads
                .get(contact_id)
                .map_or(false, |t| t.iter().any(|m| m.id == message_id));
            if !exists {
                debug!("Ignoring delete of unknown message {}", message_id);
                return;
            }
            Self::replace_thread(&mut inner, contact_id, |thread| {
                thread.retain(|m| m.id != message_id)
            });
        }
        if let Some(task) = self.progressions.lock().await.remove(message_id) {
            task.abort();
        }
        info!("Deleted message {} from {}", message_id, contact_id);
    }

    /// Flip a message's starred flag.
    pub async fn toggle_star(&self, contact_id: &str, message_id: &str) {
        let mut inner = self.inner.lock().await;
        let exists = inner
            .threads
            .get(contact_id)
            .map_or(false, |t| t.iter().any(|m| m.id == message_id));
        if !exists {
            debug!("Ignoring star toggle for unknown message {}", message_id);
            return;
        }
        Self::replace_thread(&mut inner, contact_id, |thread| {
            if let Some(message) = thread.iter_mut().find(|m| m.id == message_id) {
                message.is_starred = !message.is_starred;
            }
        });
    }

    async fn schedule_progression(&self, contact_id: &str, message_id: &str) {
        let inner = Arc::clone(&self.inner);
        let progressions = Arc::clone(&self.progressions);
        let events_tx = self.events_tx.clone();
        let delays = self.delays;
        let contact_id = contact_id.to_string();
        let message_id = message_id.to_string();

        let task_key = message_id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delays.delivered).await;
            if Self::apply_status(&inner, &contact_id, &message_id, DeliveryStatus::Delivered).await
            {
                notify_status(&events_tx, &contact_id, &message_id, DeliveryStatus::Delivered)
                    .await;
                tokio::time::sleep(delays.read).await;
                if Self::apply_status(&inner, &contact_id, &message_id, DeliveryStatus::Read).await
                {
                    notify_status(&events_tx, &contact_id, &message_id, DeliveryStatus::Read).await;
                }
            }
            progressions.lock().await.remove(&message_id);
        });
        self.progressions.lock().await.insert(task_key, task);
    }

    /// Advance one message's status. Returns false when the message no
    /// longer exists or the transition would not move forward; a stale
    /// schedule is a safe no-op and never resurrects a deleted message.
    pub(crate) async fn apply_status(
        inner: &Arc<TokioMutex<StoreInner>>,
        contact_id: &str,
        message_id: &str,
        status: DeliveryStatus,
    ) -> bool {
        let mut guard = inner.lock().await;
        let current = guard
            .threads
            .get(contact_id)
            .and_then(|t| t.iter().find(|m| m.id == message_id))
            .map(|m| m.status);
        let Some(current) = current else {
            debug!("Skipping status update for missing message {}", message_id);
            return false;
        };
        if status <= current {
            debug!(
                "Ignoring non-forward status transition for {}: {:?} -> {:?}",
                message_id, current, status
            );
            return false;
        }
        Self::replace_thread(&mut guard, contact_id, |thread| {
            if let Some(message) = thread.iter_mut().find(|m| m.id == message_id) {
                info!(
                    "Message {} status {:?} -> {:?}",
                    message_id, current, status
                );
                message.status = status;
            }
        });
        true
    }
}

async fn notify_status(
    events_tx: &mpsc::Sender<ConversationEvent>,
    contact_id: &str,
    message_id: &str,
    status: DeliveryStatus,
) {
    let event = ConversationEvent::StatusChanged {
        contact_id: contact_id.to_string(),
        message_id: message_id.to_string(),
        status,
    };
    if events_tx.send(event).await.is_err() {
        debug!("No listener for status change on {}", message_id);
    }
}
