//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{book_instance::BookInstanceDetails, genre::Genre, language::Language};

/// Genres shown by [`display_genre`]
const DISPLAYED_GENRES: usize = 3;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, if any
    pub author_name: Option<String>,
}

/// Reduced author info embedded in book details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookAuthor {
    pub id: i32,
    pub name: String,
}

/// Book with its relations resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    /// "Title[iso]" label
    pub display: String,
    pub author: Option<BookAuthor>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    pub display_genre: String,
    pub instances: Vec<BookInstanceDetails>,
}

/// Book label: the title followed by the language code when the language is known.
pub fn display_title(title: &str, iso_code: Option<&str>) -> String {
    match iso_code {
        Some(iso) => format!("{}[{}]", title, iso),
        None => title.to_string(),
    }
}

/// Names of the first genres, comma separated
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAYED_GENRES)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Book search/list parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    pub page: Option<i64>,
    /// Case-insensitive title substring
    pub title: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 10000, message = "Summary must be at most 10000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request; `null` clears a reference, an absent key leaves it untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 10000, message = "Summary must be at most 10000 characters"))]
    pub summary: Option<String>,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub language_id: Option<Option<i32>>,
    /// Replaces the whole genre set when present
    pub genre_ids: Option<Vec<i32>>,
}
