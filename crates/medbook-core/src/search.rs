// Search-as-you-type pagination over the remote book index
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    models::{Book, SortBy},
    Result,
};

/// Queries shorter than this never hit the network
pub const MIN_QUERY_LEN: usize = 3;

/// Fixed page size; a short page means the result set is exhausted
pub const PAGE_SIZE: usize = medbook_api::PAGE_SIZE;

/// Trait for the remote searcher - makes testing easier and keeps things flexible
///
/// Production code plugs in the OpenLibrary client; tests plug in fakes.
#[async_trait::async_trait]
pub trait BookSearcher: Send + Sync {
    async fn search_books(&self, title: &str, offset: usize) -> Result<Vec<Book>>;
}

#[async_trait::async_trait]
impl BookSearcher for medbook_api::OpenLibraryClient {
    async fn search_books(&self, title: &str, offset: usize) -> Result<Vec<Book>> {
        let docs = self.search_books(title, offset).await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }
}

/// One incremental search in progress
///
/// Reset wholesale whenever the query changes; nothing here survives a
/// query switch except the generation counter, which is what lets a
/// completion for a superseded query be recognized and discarded.
#[derive(Debug, Default)]
struct SearchSession {
    query: String,
    offset: usize,
    books: Vec<Book>,
    exhausted: bool,
    in_flight: bool,
    generation: u64,
}

/// Drives the search-as-you-type and "load more" flow
///
/// At most one fetch is in flight at a time. A query change arriving
/// while a fetch is in flight is dropped silently, not queued.
pub struct SearchController {
    searcher: Arc<dyn BookSearcher>,
    session: SearchSession,
}

impl SearchController {
    pub fn new(searcher: Arc<dyn BookSearcher>) -> Self {
        Self {
            searcher,
            session: SearchSession::default(),
        }
    }

    /// The accumulated result list in insertion order
    pub fn books(&self) -> &[Book] {
        &self.session.books
    }

    /// Pure sorted projection of the accumulated list
    pub fn sorted(&self, sort: SortBy) -> Vec<Book> {
        sort.apply(&self.session.books)
    }

    pub fn query(&self) -> &str {
        &self.session.query
    }

    pub fn offset(&self) -> usize {
        self.session.offset
    }

    /// True once a page came back short or the remote reported no data
    pub fn is_exhausted(&self) -> bool {
        self.session.exhausted
    }

    /// React to the search field changing
    ///
    /// Queries under MIN_QUERY_LEN clear the session and show nothing.
    /// Longer queries start over at offset 0.
    pub async fn set_query(&mut self, query: &str) -> Result<()> {
        if self.session.in_flight {
            debug!("Query change to '{}' dropped, fetch in flight", query);
            return Ok(());
        }

        self.session.generation += 1;
        self.session.query = query.to_string();
        self.session.offset = 0;
        self.session.exhausted = false;

        if query.chars().count() < MIN_QUERY_LEN {
            self.session.books.clear();
            return Ok(());
        }

        self.fetch().await
    }

    /// Fetch the next page, if there is one
    pub async fn load_more(&mut self) -> Result<()> {
        if self.session.exhausted {
            debug!("load_more ignored, result set exhausted");
            return Ok(());
        }
        if self.session.in_flight {
            debug!("load_more ignored, fetch in flight");
            return Ok(());
        }

        self.session.offset += PAGE_SIZE;
        self.fetch().await
    }

    async fn fetch(&mut self) -> Result<()> {
        let generation = self.session.generation;
        let offset = self.session.offset;
        let title = self.session.query.to_lowercase();

        self.session.in_flight = true;
        let outcome = self.searcher.search_books(&title, offset).await;
        self.session.in_flight = false;

        match outcome {
            Ok(page) => {
                self.apply_page(generation, offset, page);
                Ok(())
            }
            Err(err) if err.is_no_data() => {
                // End of results wearing an error costume
                info!("Search for '{}' at offset {} returned no data", title, offset);
                self.session.exhausted = true;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Merge a fetched page into the session
    ///
    /// A page whose generation no longer matches belongs to a superseded
    /// query and is dropped.
    fn apply_page(&mut self, generation: u64, offset: usize, page: Vec<Book>) {
        if generation != self.session.generation {
            debug!(
                "Discarding stale page (generation {} != {})",
                generation, self.session.generation
            );
            return;
        }

        if page.len() < PAGE_SIZE {
            self.session.exhausted = true;
        }

        if offset == 0 {
            self.session.books = page;
        } else {
            self.session.books.extend(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fake_page(total: usize, title: &str, offset: usize) -> Vec<Book> {
        let end = total.min(offset + PAGE_SIZE);
        (offset..end)
            .map(|i| Book {
                title: format!("{} #{}", title, i),
                ratings_average: None,
                ratings_count: None,
                author_name: None,
                cover_i: None,
            })
            .collect()
    }

    /// Fake searcher serving a fixed catalogue ten docs at a time
    struct FakeSearcher {
        total: usize,
        calls: AtomicUsize,
    }

    impl FakeSearcher {
        fn with_total(total: usize) -> Self {
            Self {
                total,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl BookSearcher for FakeSearcher {
        async fn search_books(&self, title: &str, offset: usize) -> Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(fake_page(self.total, title, offset))
        }
    }

    /// Fails one specific call, serves the catalogue otherwise
    struct FlakySearcher {
        total: usize,
        fail_on_call: usize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl BookSearcher for FlakySearcher {
        async fn search_books(&self, title: &str, offset: usize) -> Result<Vec<Book>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on_call {
                return Err(
                    medbook_api::openlibrary::OpenLibraryError::RequestFailed(
                        "Status 500: upstream unhappy".to_string(),
                    )
                    .into(),
                );
            }
            Ok(fake_page(self.total, title, offset))
        }
    }

    struct NoDataSearcher;

    #[async_trait::async_trait]
    impl BookSearcher for NoDataSearcher {
        async fn search_books(&self, _title: &str, _offset: usize) -> Result<Vec<Book>> {
            Err(medbook_api::openlibrary::OpenLibraryError::NoData.into())
        }
    }

    #[tokio::test]
    async fn test_short_query_is_empty_and_offline() {
        let searcher = Arc::new(FakeSearcher::with_total(30));
        let mut controller = SearchController::new(searcher.clone());

        for query in ["", "h", "ha"] {
            controller.set_query(query).await.unwrap();
            assert!(controller.books().is_empty());
        }
        assert_eq!(searcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_page_keeps_load_more_alive() {
        let searcher = Arc::new(FakeSearcher::with_total(30));
        let mut controller = SearchController::new(searcher);

        controller.set_query("harry").await.unwrap();
        assert_eq!(controller.books().len(), 10);
        assert!(!controller.is_exhausted());

        controller.load_more().await.unwrap();
        assert_eq!(controller.books().len(), 20);
        assert!(!controller.is_exhausted());
    }

    #[tokio::test]
    async fn test_harry_scenario_thirteen_results() {
        let searcher = Arc::new(FakeSearcher::with_total(13));
        let mut controller = SearchController::new(searcher.clone());

        controller.set_query("harry").await.unwrap();
        assert_eq!(controller.books().len(), 10);
        assert_eq!(controller.offset(), 0);

        controller.load_more().await.unwrap();
        assert_eq!(controller.offset(), 10);
        assert_eq!(controller.books().len(), 13);
        assert!(controller.is_exhausted());

        // further load_more calls are no-ops, permanently
        let calls_before = searcher.calls();
        controller.load_more().await.unwrap();
        controller.load_more().await.unwrap();
        assert_eq!(searcher.calls(), calls_before);
        assert_eq!(controller.books().len(), 13);
        assert!(controller.is_exhausted());
    }

    #[tokio::test]
    async fn test_query_change_resets_offset_and_replaces_list() {
        let searcher = Arc::new(FakeSearcher::with_total(30));
        let mut controller = SearchController::new(searcher);

        controller.set_query("harry").await.unwrap();
        controller.load_more().await.unwrap();
        assert_eq!(controller.books().len(), 20);

        controller.set_query("dune").await.unwrap();
        assert_eq!(controller.offset(), 0);
        assert_eq!(controller.books().len(), 10);
        assert!(controller.books()[0].title.starts_with("dune"));
    }

    #[tokio::test]
    async fn test_query_is_lowercased_for_the_wire() {
        let searcher = Arc::new(FakeSearcher::with_total(5));
        let mut controller = SearchController::new(searcher);

        controller.set_query("Harry Potter").await.unwrap();
        assert!(controller.books()[0].title.starts_with("harry potter"));
    }

    #[tokio::test]
    async fn test_no_data_error_is_benign_exhaustion() {
        let mut controller = SearchController::new(Arc::new(NoDataSearcher));

        controller.set_query("harry").await.unwrap();
        assert!(controller.books().is_empty());
        assert!(controller.is_exhausted());
    }

    #[tokio::test]
    async fn test_search_failure_abandons_attempt() {
        let searcher = Arc::new(FlakySearcher {
            total: 30,
            fail_on_call: 2,
            calls: AtomicUsize::new(0),
        });
        let mut controller = SearchController::new(searcher);

        controller.set_query("harry").await.unwrap();
        assert_eq!(controller.books().len(), 10);

        // the second fetch blows up; the error surfaces and nothing
        // already accumulated is touched
        let err = controller.load_more().await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Search(
                medbook_api::openlibrary::OpenLibraryError::RequestFailed(_)
            )
        ));
        assert_eq!(controller.books().len(), 10);
        assert!(!controller.is_exhausted());

        // no automatic retry, but a fresh user action works fine
        controller.set_query("harry").await.unwrap();
        assert_eq!(controller.books().len(), 10);
        controller.load_more().await.unwrap();
        assert_eq!(controller.books().len(), 20);
    }

    #[tokio::test]
    async fn test_exhaustion_clears_on_new_query() {
        let searcher = Arc::new(FakeSearcher::with_total(3));
        let mut controller = SearchController::new(searcher);

        controller.set_query("rare").await.unwrap();
        assert!(controller.is_exhausted());

        controller.set_query("harry").await.unwrap();
        assert!(!controller.is_exhausted());
        assert_eq!(controller.books().len(), 10);
    }

    #[tokio::test]
    async fn test_stale_page_is_discarded() {
        let searcher = Arc::new(FakeSearcher::with_total(30));
        let mut controller = SearchController::new(searcher);

        controller.set_query("harry").await.unwrap();
        let stale_generation = controller.session.generation;

        controller.set_query("dune").await.unwrap();
        let dune_books = controller.books().to_vec();

        // a late completion from the "harry" fetch must not land
        controller.apply_page(
            stale_generation,
            0,
            vec![Book {
                title: "harry straggler".to_string(),
                ratings_average: None,
                ratings_count: None,
                author_name: None,
                cover_i: None,
            }],
        );
        assert_eq!(controller.books(), dune_books.as_slice());
    }

    #[tokio::test]
    async fn test_sorted_projection_does_not_mutate() {
        let searcher = Arc::new(FakeSearcher::with_total(10));
        let mut controller = SearchController::new(searcher);
        controller.set_query("harry").await.unwrap();

        let before = controller.books().to_vec();
        let _ = controller.sorted(SortBy::Title);
        assert_eq!(controller.books(), before.as_slice());
    }
}
