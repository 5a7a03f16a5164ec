use thiserror::Error;

const COVERS_API_BASE: &str = "https://covers.openlibrary.org";

#[derive(Error, Debug)]
pub enum CoversError {
    #[error("Cover not available: {0}")]
    NotAvailable(i64),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CoversError>;

/// Cover image sizes the covers endpoint serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    fn suffix(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

pub struct CoversClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoversClient {
    pub fn new() -> Self {
        Self::with_base_url(COVERS_API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Fetch raw cover image bytes by cover identifier
    ///
    /// Used fire-and-forget when a bookmark is saved; callers log and
    /// drop failures rather than propagate them.
    pub async fn fetch_cover(&self, cover_i: i64, size: CoverSize) -> Result<Vec<u8>> {
        let url = format!("{}/b/id/{}-{}.jpg", self.base_url, cover_i, size.suffix());

        tracing::debug!("Fetching cover image {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CoversError::NotAvailable(cover_i));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl Default for CoversClient {
    fn default() -> Self {
        Self::new()
    }
}
