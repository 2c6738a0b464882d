//! Languages repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{language::CreateLanguage, Language},
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Postgres>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all languages by name
    pub async fn list(&self) -> AppResult<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT * FROM languages ORDER BY language, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(languages)
    }

    /// Get language by ID, if any
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Language>> {
        let language = sqlx::query_as::<_, Language>("SELECT * FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(language)
    }

    /// Create language; the ISO code is unique
    pub async fn create(&self, data: &CreateLanguage) -> AppResult<Language> {
        let language = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (iso_code, language) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.iso_code)
        .bind(&data.language)
        .fetch_one(&self.pool)
        .await?;
        Ok(language)
    }
}
