//! In-memory thread store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::agent_loop::Conversation;

pub type SharedConversation = Arc<Mutex<Conversation>>;

/// Conversations keyed by thread id.
///
/// Each conversation sits behind its own lock, so turns on one thread are
/// serialized while different threads run concurrently.
#[derive(Clone, Default)]
pub struct ThreadStore {
    threads: Arc<Mutex<HashMap<String, SharedConversation>>>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the thread and whether it was just created.
    pub async fn get_or_create(&self, thread_id: &str) -> (SharedConversation, bool) {
        let mut threads = self.threads.lock().await;
        if let Some(existing) = threads.get(thread_id) {
            return (existing.clone(), false);
        }
        tracing::debug!(thread_id, "Creating thread");
        let conversation = Arc::new(Mutex::new(Conversation::new()));
        threads.insert(thread_id.to_string(), conversation.clone());
        (conversation, true)
    }

    pub async fn get(&self, thread_id: &str) -> Option<SharedConversation> {
        self.threads.lock().await.get(thread_id).cloned()
    }

    pub async fn remove(&self, thread_id: &str) -> bool {
        self.threads.lock().await.remove(thread_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.threads.lock().await.len()
    }
}
