//! Statistics service

use crate::{
    api::stats::{CatalogStats, TitleSearchCount},
    error::AppResult,
    models::LoanStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Catalog counts; `title` adds the number of books whose title contains it
    pub async fn get_stats(&self, title: Option<&str>) -> AppResult<CatalogStats> {
        let title_search = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => Some(TitleSearchCount {
                term: term.to_string(),
                count: self.repository.books.count(Some(term)).await?,
            }),
            None => None,
        };

        Ok(CatalogStats {
            books: self.repository.books.count(None).await?,
            instances: self.repository.instances.count().await?,
            instances_available: self
                .repository
                .instances
                .count_by_status(LoanStatus::Available)
                .await?,
            authors: self.repository.authors.count().await?,
            genres: self.repository.genres.count().await?,
            title_search,
        })
    }
}
