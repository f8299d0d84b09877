// Contact-list operations: seeding, selection, presence, and the filter
// surface consumed by the contact pane.

use log::{debug, warn};

use super::ConversationStore;
use crate::models::Contact;

impl ConversationStore {
    /// Add a contact at the end of the existing order. Duplicate ids are
    /// ignored.
    pub async fn add_contact(&self, contact: Contact) {
        let mut inner = self.inner.lock().await;
        if inner.contacts.iter().any(|c| c.id == contact.id) {
            warn!("Ignoring duplicate contact {}", contact.id);
            return;
        }
        debug!("Added contact {} ({})", contact.id, contact.name);
        inner.contacts.push(contact);
    }

    pub async fn seed_contacts(&self, contacts: Vec<Contact>) {
        for contact in contacts {
            self.add_contact(contact).await;
        }
    }

    /// Make a contact active. A positive unread count resets to zero as
    /// part of the same mutation; no separate mark-read step exists.
    pub async fn select_contact(&self, contact_id: &str) {
        let mut inner = self.inner.lock().await;
        let Some(contact) = inner.contacts.iter_mut().find(|c| c.id == contact_id) else {
            warn!("Ignoring selection of unknown contact {}", contact_id);
            return;
        };
        contact.unread_count = 0;
        inner.active_contact = Some(contact_id.to_string());
        debug!("Selected contact {}", contact_id);
    }

    /// All contacts in their existing order.
    pub async fn list_contacts(&self) -> Vec<Contact> {
        self.inner.lock().await.contacts.clone()
    }

    /// Case-insensitive substring filter over name and last-message
    /// preview, intersected with tag membership (`"all"` matches every
    /// tag). Existing order is preserved; no relevance re-sort.
    pub async fn find_contacts(&self, query: &str, tag: &str) -> Vec<Contact> {
        let needle = query.to_lowercase();
        let inner = self.inner.lock().await;
        inner
            .contacts
            .iter()
            .filter(|c| {
                let text_match = needle.is_empty()
                    || c.name.to_lowercase().contains(&needle)
                    || c.last_message_preview.to_lowercase().contains(&needle);
                let tag_match = tag == "all" || c.tags.iter().any(|t| t == tag);
                text_match && tag_match
            })
            .cloned()
            .collect()
    }

    /// Update a contact's presence flag.
    pub async fn set_online(&self, contact_id: &str, online: bool) {
        let mut inner = self.inner.lock().await;
        match inner.contacts.iter_mut().find(|c| c.id == contact_id) {
            Some(contact) => contact.online = online,
            None => debug!("Ignoring presence update for unknown contact {}", contact_id),
        }
    }
}
