//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Language a book is written in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    /// ISO 639-1 two-letter code, unique
    pub iso_code: String,
    pub language: String,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.language)
    }
}

/// Create language request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLanguage {
    #[validate(length(equal = 2, message = "ISO code must have exactly 2 letters"))]
    pub iso_code: String,
    #[validate(length(min = 1, max = 30, message = "Language name must be 1 to 30 characters"))]
    pub language: String,
}
