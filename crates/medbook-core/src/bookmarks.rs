// Keeps displayed bookmark indicators in step with the local store
use std::sync::Arc;

use medbook_store::{BookmarkUpdate, LocalStore};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{models::Book, Result};

/// Write-through bookmark state for one signed-in owner
///
/// The store key is (title, owner email) only, so the lookup result is
/// re-checked against the exact displayed title before the indicator
/// lights up. Colliding titles across editions stay indistinguishable;
/// that is inherited, documented behavior.
pub struct BookmarkSync {
    store: Arc<LocalStore>,
    covers: Arc<medbook_api::CoversClient>,
    owner_email: String,
}

impl BookmarkSync {
    pub fn new(
        store: Arc<LocalStore>,
        covers: Arc<medbook_api::CoversClient>,
        owner_email: impl Into<String>,
    ) -> Self {
        Self {
            store,
            covers,
            owner_email: owner_email.into(),
        }
    }

    pub fn owner_email(&self) -> &str {
        &self.owner_email
    }

    /// Whether this book should show as bookmarked right now
    pub fn is_bookmarked(&self, book: &Book) -> bool {
        match self.store.bookmark_exists::<Book>(&book.title, &self.owner_email) {
            Ok(Some(saved)) => saved.title == book.title,
            Ok(None) => false,
            Err(err) => {
                warn!("Bookmark lookup failed for '{}': {}", book.title, err);
                false
            }
        }
    }

    /// The sole write path: indicator on saves, indicator off deletes
    ///
    /// Saving also kicks off a cover image fetch for local caching; that
    /// fetch is fire-and-forget and its failure never fails the save.
    pub fn toggle(&self, book: &Book, bookmarked: bool) -> Result<()> {
        if bookmarked {
            self.store
                .save_bookmark(book, &book.title, &self.owner_email)?;
            self.prefetch_cover(book);
        } else {
            self.store.delete_bookmark(&book.title, &self.owner_email)?;
        }
        Ok(())
    }

    /// Change snapshots for this owner's bookmarks
    pub fn subscribe(&self) -> broadcast::Receiver<BookmarkUpdate> {
        self.store.subscribe(&self.owner_email)
    }

    /// Recompute an indicator from a received snapshot
    ///
    /// This is how a toggle in one view reaches every other view showing
    /// the same title.
    pub fn indicator_from(book: &Book, update: &BookmarkUpdate) -> bool {
        update
            .decode::<Book>()
            .iter()
            .any(|saved| saved.title == book.title)
    }

    fn prefetch_cover(&self, book: &Book) {
        let Some(cover_i) = book.cover_i else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, skipping cover prefetch for '{}'", book.title);
            return;
        };

        let covers = Arc::clone(&self.covers);
        let title = book.title.clone();
        handle.spawn(async move {
            match covers.fetch_cover(cover_i, medbook_api::CoverSize::Medium).await {
                Ok(bytes) => debug!("Prefetched {} cover bytes for '{}'", bytes.len(), title),
                Err(err) => debug!("Cover prefetch failed for '{}': {}", title, err),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Arc<LocalStore> {
        Arc::new(LocalStore::in_memory().unwrap())
    }

    fn sync(store: &Arc<LocalStore>, owner: &str) -> BookmarkSync {
        BookmarkSync::new(
            Arc::clone(store),
            Arc::new(medbook_api::CoversClient::new()),
            owner,
        )
    }

    fn book(title: &str) -> Book {
        Book {
            title: title.to_string(),
            ratings_average: Some(4.0),
            ratings_count: Some(100),
            author_name: Some(vec!["Frank Herbert".to_string()]),
            cover_i: None,
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let store = store();
        let sync = sync(&store, "reader@example.com");
        let dune = book("Dune");

        assert!(!sync.is_bookmarked(&dune));

        sync.toggle(&dune, true).unwrap();
        assert!(sync.is_bookmarked(&dune));

        sync.toggle(&dune, false).unwrap();
        assert!(!sync.is_bookmarked(&dune));
    }

    #[test]
    fn test_toggle_does_not_touch_other_owners() {
        let store = store();
        let a = sync(&store, "a@example.com");
        let b = sync(&store, "b@example.com");
        let dune = book("Dune");

        a.toggle(&dune, true).unwrap();
        b.toggle(&dune, true).unwrap();
        a.toggle(&dune, false).unwrap();

        assert!(!a.is_bookmarked(&dune));
        assert!(b.is_bookmarked(&dune));
    }

    #[tokio::test]
    async fn test_snapshot_refreshes_other_views() {
        let store = store();
        let list_view = sync(&store, "reader@example.com");
        let detail_view = sync(&store, "reader@example.com");
        let dune = book("Dune");

        let mut rx = detail_view.subscribe();
        list_view.toggle(&dune, true).unwrap();

        let update = rx.recv().await.unwrap();
        assert!(BookmarkSync::indicator_from(&dune, &update));

        list_view.toggle(&dune, false).unwrap();
        let update = rx.recv().await.unwrap();
        assert!(!BookmarkSync::indicator_from(&dune, &update));
    }

    #[test]
    fn test_save_overwrites_record_fields() {
        let store = store();
        let sync = sync(&store, "reader@example.com");

        let mut dune = book("Dune");
        sync.toggle(&dune, true).unwrap();

        dune.ratings_average = Some(4.7);
        sync.toggle(&dune, true).unwrap();

        let books: Vec<Book> = store.list_bookmarks("reader@example.com").unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].ratings_average, Some(4.7));
    }
}
