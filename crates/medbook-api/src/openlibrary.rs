use serde::{Deserialize, Serialize};
use thiserror::Error;

const OPENLIBRARY_API_BASE: &str = "https://openlibrary.org";

/// Fixed page size for search requests. The pagination layer upstream
/// relies on short pages (< PAGE_SIZE docs) meaning "no further pages".
pub const PAGE_SIZE: usize = 10;

#[derive(Error, Debug)]
pub enum OpenLibraryError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("No data received")]
    NoData,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpenLibraryError>;

pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new() -> Self {
        Self::with_base_url(OPENLIBRARY_API_BASE.to_string())
    }

    /// For pointing at a mirror or a local test server
    pub fn with_base_url(base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("MedBook/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    /// Search books by title, one fixed-size page at a time
    ///
    /// `offset` is a running skip count, always a multiple of PAGE_SIZE.
    /// A response with fewer than PAGE_SIZE docs means the result set is
    /// exhausted; an empty body is reported as `NoData` and treated the
    /// same way by callers.
    pub async fn search_books(&self, title: &str, offset: usize) -> Result<Vec<BookDoc>> {
        let encoded_title = urlencoding::encode(title);
        let url = format!(
            "{}/search.json?title={}&limit={}&offset={}",
            self.base_url, encoded_title, PAGE_SIZE, offset
        );

        tracing::debug!("Searching books: title={} offset={}", title, offset);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OpenLibraryError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(OpenLibraryError::NoData);
        }

        let search: SearchResponse = serde_json::from_str(&body)?;
        Ok(search.docs)
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level search response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<BookDoc>,
    #[serde(default)]
    pub num_found: u64,
}

/// A single book record as OpenLibrary returns it
///
/// Everything but the title is optional in practice; the ratings fields
/// in particular are missing for most of the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDoc {
    pub title: String,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub ratings_average: Option<f64>,
    #[serde(default)]
    pub ratings_count: Option<i64>,
}
