// Core business logic lives here - the brain of the operation
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod models;
pub mod onboarding;
pub mod search;
pub mod validation;

pub use auth::Accounts;
pub use bookmarks::BookmarkSync;
pub use config::Config;
pub use error::Error;
pub use models::{Book, SortBy};
pub use onboarding::{CountryOnboarding, CountrySetup};
pub use search::{BookSearcher, SearchController, MIN_QUERY_LEN, PAGE_SIZE};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
