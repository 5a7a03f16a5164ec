use medbook_api::BookDoc;
use serde::{Deserialize, Serialize};

/// Book model - the star of the show
///
/// The serialized shape matches what the store persists, so a bookmark
/// written today round-trips through the JSON column unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub title: String,
    pub ratings_average: Option<f64>,
    pub ratings_count: Option<i64>,
    pub author_name: Option<Vec<String>>,
    pub cover_i: Option<i64>,
}

impl Book {
    /// Author list formatted for a list row: "A, B & C." or "No Author"
    pub fn author_display(&self) -> String {
        let names: Vec<&str> = self
            .author_name
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return "No Author".to_string();
        }

        let mut display = match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("{} & {}", rest.join(", "), last)
            }
            _ => names[0].to_string(),
        };

        if !display.ends_with('.') {
            display.push('.');
        }
        display
    }
}

impl From<BookDoc> for Book {
    fn from(doc: BookDoc) -> Self {
        Self {
            title: doc.title,
            ratings_average: doc.ratings_average,
            ratings_count: doc.ratings_count,
            author_name: doc.author_name,
            cover_i: doc.cover_i,
        }
    }
}

/// How the accumulated result list is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Insertion order, untouched
    #[default]
    None,
    /// Title ascending, lexicographic
    Title,
    /// Ratings average descending, missing treated as 0
    Average,
    /// Ratings count descending, missing treated as 0
    Hits,
}

impl SortBy {
    /// Pure sorted view over the list; the input order is never mutated
    /// and ties keep their relative order
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let mut view = books.to_vec();
        match self {
            SortBy::None => {}
            SortBy::Title => view.sort_by(|a, b| a.title.cmp(&b.title)),
            SortBy::Average => view.sort_by(|a, b| {
                let a = a.ratings_average.unwrap_or(0.0);
                let b = b.ratings_average.unwrap_or(0.0);
                b.total_cmp(&a)
            }),
            SortBy::Hits => view.sort_by(|a, b| {
                let a = a.ratings_count.unwrap_or(0);
                let b = b.ratings_count.unwrap_or(0);
                b.cmp(&a)
            }),
        }
        view
    }
}
