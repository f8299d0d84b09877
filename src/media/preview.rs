// Local resource handles for attachment previews.
// Allocation and release are paired 1:1 at the staging mutation sites, so a
// handle is revoked exactly when its staged form is discarded and never
// while it is still visible.

use log::warn;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Token for a locally-resolvable preview resource, shaped like a blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(pub String);

pub trait PreviewAllocator: Send + Sync {
    fn create_from_blob(&self, bytes: &[u8]) -> PreviewHandle;
    fn revoke(&self, handle: &PreviewHandle);
}

/// In-memory allocator backing the console session. Tracks live handles so
/// tests can observe leaks and double releases.
#[derive(Default)]
pub struct InMemoryPreviews {
    live: Mutex<HashMap<String, usize>>,
}

impl InMemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently allocated handles.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|m| m.len()).unwrap_or(0)
    }
}

impl PreviewAllocator for InMemoryPreviews {
    fn create_from_blob(&self, bytes: &[u8]) -> PreviewHandle {
        let token = format!("blob:{}", Uuid::new_v4());
        if let Ok(mut live) = self.live.lock() {
            live.insert(token.clone(), bytes.len());
        }
        PreviewHandle(token)
    }

    fn revoke(&self, handle: &PreviewHandle) {
        if let Ok(mut live) = self.live.lock() {
            if live.remove(&handle.0).is_none() {
                warn!("Revoke of unknown or already-released handle {}", handle.0);
            }
        }
    }
}
