//! Data models for the Local Library

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookShort};
pub use book_instance::{BookInstance, BookInstanceDetails, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use user::{User, UserClaims};

/// Page size of every catalog and loan listing
pub const PAGE_SIZE: i64 = 5;

/// `?page=N` query parameter (1-based)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// A requested page of a listing, validated against the collection size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1),
            per_page,
        }
    }

    /// `?page=` of a listing; pages below 1, or whose offset does not fit
    /// an `i64`, are rejected before any query runs
    pub fn requested(page: Option<i64>) -> AppResult<Self> {
        let pagination = Self::new(page, PAGE_SIZE);
        let reachable = pagination.page >= 1
            && (pagination.page - 1).checked_mul(pagination.per_page).is_some();
        if !reachable {
            return Err(AppError::NotFound(format!("Invalid page ({})", pagination.page)));
        }
        Ok(pagination)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.per_page)
    }

    /// Number of pages for `total` rows; an empty collection still has one page.
    pub fn num_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }

    /// Reject pages outside `1..=num_pages`
    pub fn check(&self, total: i64) -> AppResult<()> {
        if self.page < 1 || self.page > self.num_pages(total) {
            return Err(AppError::NotFound(format!("Invalid page ({})", self.page)));
        }
        Ok(())
    }
}

/// One page of results together with the collection size
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> i64 {
        self.pagination.num_pages(self.total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pagination: self.pagination,
        }
    }
}
