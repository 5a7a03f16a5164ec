// Change notification for bookmark writes
//
// Each owner email gets its own broadcast topic. A write publishes the
// full current bookmark list for that owner, so every subscriber can
// re-derive its own state from the snapshot without further queries.
use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

const TOPIC_CAPACITY: usize = 16;

/// Snapshot published after every bookmark write for an owner
#[derive(Debug, Clone)]
pub struct BookmarkUpdate {
    pub owner_email: String,
    pub bookmarks: Vec<serde_json::Value>,
}

impl BookmarkUpdate {
    /// Decode the snapshot into typed records, skipping any rows that no
    /// longer match the expected shape
    pub fn decode<T: DeserializeOwned>(&self) -> Vec<T> {
        self.bookmarks
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }
}

/// Per-owner publish/subscribe registry
pub struct BookmarkTopics {
    topics: Mutex<HashMap<String, broadcast::Sender<BookmarkUpdate>>>,
}

impl BookmarkTopics {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to bookmark changes for one owner email
    pub fn subscribe(&self, owner_email: &str) -> broadcast::Receiver<BookmarkUpdate> {
        let key = owner_email.to_lowercase();
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics
            .entry(key)
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Publish a snapshot to the owner's topic
    ///
    /// A topic with no live subscribers is not an error; the send result
    /// is deliberately dropped.
    pub fn publish(&self, update: BookmarkUpdate) {
        let key = update.owner_email.to_lowercase();
        let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = topics.get(&key) {
            let _ = sender.send(update);
        }
    }
}

impl Default for BookmarkTopics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_update() {
        let topics = BookmarkTopics::new();
        let mut rx = topics.subscribe("reader@example.com");

        topics.publish(BookmarkUpdate {
            owner_email: "reader@example.com".to_string(),
            bookmarks: vec![serde_json::json!({"title": "Dune"})],
        });

        let update = rx.recv().await.unwrap();
        assert_eq!(update.bookmarks.len(), 1);
    }

    #[tokio::test]
    async fn test_topics_are_scoped_by_owner() {
        let topics = BookmarkTopics::new();
        let mut other = topics.subscribe("other@example.com");

        topics.publish(BookmarkUpdate {
            owner_email: "reader@example.com".to_string(),
            bookmarks: vec![],
        });

        assert!(matches!(
            other.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_owner_topic_is_case_folded() {
        let topics = BookmarkTopics::new();
        let mut rx = topics.subscribe("Reader@Example.com");

        topics.publish(BookmarkUpdate {
            owner_email: "reader@example.com".to_string(),
            bookmarks: vec![],
        });

        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let topics = BookmarkTopics::new();
        topics.publish(BookmarkUpdate {
            owner_email: "nobody@example.com".to_string(),
            bookmarks: vec![],
        });
    }
}
