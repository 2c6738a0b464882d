//! Statistics endpoints

use axum::{extract::Query, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;

/// Catalog statistics
#[derive(Serialize, ToSchema)]
pub struct CatalogStats {
    /// Number of books
    pub books: i64,
    /// Number of book copies
    pub instances: i64,
    /// Copies with status "available"
    pub instances_available: i64,
    /// Number of authors
    pub authors: i64,
    /// Number of genres
    pub genres: i64,
    /// Present when a title search term was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_search: Option<TitleSearchCount>,
}

#[derive(Serialize, ToSchema)]
pub struct TitleSearchCount {
    pub term: String,
    /// Books whose title contains the term (case-insensitive)
    pub count: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Count books whose title contains this term
    pub title: Option<String>,
}

/// Get catalog statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<CatalogStats>> {
    let stats = state.services.stats.get_stats(query.title.as_deref()).await?;
    Ok(Json(stats))
}
