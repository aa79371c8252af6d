//! In-process lock bookkeeping
//!
//! A small map from object URI to the lock handle held for it, used only
//! by the workflow composer. Entries live for the duration of one
//! workflow; nothing here is exposed to the tool surface.

use std::collections::HashMap;

use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Modify,
}

#[derive(Debug, Clone)]
pub struct HeldLock {
    pub handle: String,
    pub access_mode: AccessMode,
}

#[derive(Debug, Default)]
pub struct LockBook {
    held: Mutex<HashMap<String, HeldLock>>,
}

impl LockBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, object_uri: &str, lock: HeldLock) {
        self.held.lock().await.insert(object_uri.to_string(), lock);
    }

    pub async fn take(&self, object_uri: &str) -> Option<HeldLock> {
        self.held.lock().await.remove(object_uri)
    }

    pub async fn is_held(&self, object_uri: &str) -> bool {
        self.held.lock().await.contains_key(object_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_releases_a_lock() {
        let book = LockBook::new();
        assert!(!book.is_held("/x").await);

        book.record("/x", HeldLock { handle: "h1".to_string(), access_mode: AccessMode::Modify }).await;
        assert!(book.is_held("/x").await);

        let released = book.take("/x").await;
        assert_eq!(released.unwrap().handle, "h1");
        assert!(!book.is_held("/x").await);
    }
}
