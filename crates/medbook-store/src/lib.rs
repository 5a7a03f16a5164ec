// SQLite-backed local persistence
// Accounts, bookmarks, and the cached country list live here

pub mod notify;
pub mod store;

pub use notify::{BookmarkTopics, BookmarkUpdate};
pub use store::{CountryRow, LocalStore, StoreError, UserAccount};
