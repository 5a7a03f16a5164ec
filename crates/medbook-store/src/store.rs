use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::notify::{BookmarkTopics, BookmarkUpdate};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted user account row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub email: String,
    pub password: String,
    pub logged_in: bool,
}

/// A cached country reference row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    pub country: String,
    pub region: String,
}

/// Local store over SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
///
/// Bookmarks are stored as a JSON `data` column keyed by the compound
/// (email, title) pair. Title plus owner is a deliberately loose key:
/// two editions with identical titles collide, and that is documented
/// behavior rather than something this layer second-guesses.
///
/// All access happens from a single sequential context; the store does
/// not guard against multi-threaded writers and none is required here.
pub struct LocalStore {
    conn: Connection,
    topics: BookmarkTopics,
}

impl LocalStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn,
            topics: BookmarkTopics::new(),
        })
    }

    /// In-memory store, mostly for tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn,
            topics: BookmarkTopics::new(),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                password TEXT NOT NULL,
                logged_in INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL,
                title TEXT NOT NULL,
                data TEXT NOT NULL,
                saved_at INTEGER NOT NULL,
                UNIQUE(email, title)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS countries (
                country TEXT PRIMARY KEY,
                region TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    // --- Bookmarks ---

    /// Upsert a bookmark keyed by (title, owner email)
    ///
    /// Re-saving an existing title overwrites the stored record fields.
    /// The owner's topic receives the full post-write list.
    pub fn save_bookmark<T: Serialize>(
        &self,
        book: &T,
        title: &str,
        owner_email: &str,
    ) -> Result<()> {
        let email = owner_email.to_lowercase();
        let data = serde_json::to_string(book)?;
        let saved_at = Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO bookmarks (email, title, data, saved_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email, title) DO UPDATE SET data = ?3, saved_at = ?4",
            params![email, title, data, saved_at],
        )?;

        debug!("Saved bookmark '{}' for {}", title, email);
        self.publish_bookmarks(&email)?;
        Ok(())
    }

    /// Delete a bookmark if present; absence is logged, not an error
    pub fn delete_bookmark(&self, title: &str, owner_email: &str) -> Result<()> {
        let email = owner_email.to_lowercase();
        let deleted = self.conn.execute(
            "DELETE FROM bookmarks WHERE email = ?1 AND title = ?2",
            params![email, title],
        )?;

        if deleted == 0 {
            warn!("Bookmark '{}' not found for {}, nothing to delete", title, email);
        } else {
            debug!("Deleted bookmark '{}' for {}", title, email);
        }

        self.publish_bookmarks(&email)?;
        Ok(())
    }

    /// All bookmarks for an owner in insertion order, as a fresh list
    pub fn list_bookmarks<T: DeserializeOwned>(&self, owner_email: &str) -> Result<Vec<T>> {
        let email = owner_email.to_lowercase();
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM bookmarks WHERE email = ?1 ORDER BY id")?;

        let rows = stmt.query_map(params![email], |row| row.get::<_, String>(0))?;

        let mut books = Vec::new();
        for row in rows {
            books.push(serde_json::from_str(&row?)?);
        }
        Ok(books)
    }

    /// Look up a bookmark by (title, owner email)
    ///
    /// Matching is on the compound key only, so colliding titles across
    /// different editions are indistinguishable here.
    pub fn bookmark_exists<T: DeserializeOwned>(
        &self,
        title: &str,
        owner_email: &str,
    ) -> Result<Option<T>> {
        let email = owner_email.to_lowercase();
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM bookmarks WHERE email = ?1 AND title = ?2",
                params![email, title],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Subscribe to bookmark change snapshots for one owner
    pub fn subscribe(&self, owner_email: &str) -> tokio::sync::broadcast::Receiver<BookmarkUpdate> {
        self.topics.subscribe(owner_email)
    }

    fn publish_bookmarks(&self, email: &str) -> Result<()> {
        let bookmarks: Vec<serde_json::Value> = self.list_bookmarks(email)?;
        self.topics.publish(BookmarkUpdate {
            owner_email: email.to_string(),
            bookmarks,
        });
        Ok(())
    }

    // --- Users ---

    /// Create an account; returns Ok(false) when the case-folded email
    /// is already taken
    pub fn save_user(&self, email: &str, password: &str) -> Result<bool> {
        let email = email.to_lowercase();

        if self.fetch_user(&email)?.is_some() {
            warn!("User {} already exists", email);
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO users (email, password, logged_in) VALUES (?1, ?2, 1)",
            params![email, password],
        )?;

        debug!("Created user {}", email);
        Ok(true)
    }

    pub fn fetch_user(&self, email: &str) -> Result<Option<UserAccount>> {
        let email = email.to_lowercase();
        let user = self
            .conn
            .query_row(
                "SELECT email, password, logged_in FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserAccount {
                        email: row.get(0)?,
                        password: row.get(1)?,
                        logged_in: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn set_logged_in(&self, email: &str, logged_in: bool) -> Result<()> {
        let email = email.to_lowercase();
        let updated = self.conn.execute(
            "UPDATE users SET logged_in = ?2 WHERE email = ?1",
            params![email, logged_in as i64],
        )?;

        if updated == 0 {
            warn!("set_logged_in: no user {}", email);
        }
        Ok(())
    }

    pub fn delete_user(&self, email: &str) -> Result<()> {
        let email = email.to_lowercase();
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])?;

        if deleted == 0 {
            warn!("delete_user: no user {}", email);
        }
        Ok(())
    }

    // --- Country cache ---

    /// Replace the cached country list in one transaction
    pub fn save_countries(&self, countries: &[CountryRow]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM countries", [])?;

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO countries (country, region) VALUES (?1, ?2)")?;
            for row in countries {
                stmt.execute(params![row.country, row.region])?;
            }
        }
        tx.commit()?;

        debug!("Cached {} countries", countries.len());
        Ok(())
    }

    /// Cached country list sorted by name; empty when never fetched
    pub fn load_countries(&self) -> Result<Vec<CountryRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT country, region FROM countries ORDER BY country")?;

        let rows = stmt.query_map([], |row| {
            Ok(CountryRow {
                country: row.get(0)?,
                region: row.get(1)?,
            })
        })?;

        let mut countries = Vec::new();
        for row in rows {
            countries.push(row?);
        }
        Ok(countries)
    }

    pub fn save_default_country(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES ('default_country', ?1)
             ON CONFLICT(key) DO UPDATE SET value = ?1",
            params![name],
        )?;
        Ok(())
    }

    pub fn default_country(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'default_country'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
