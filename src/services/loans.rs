//! Loan lifecycle: renewal validation, the librarian renewal workflow and
//! loaned-book listings.
//!
//! A renewal date must lie between today and four weeks ahead (both
//! inclusive). The workflow looks the copy up first, so an unknown id is a
//! not-found error even when the submitted date is also invalid.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, Page, Pagination},
    repository::LoanStore,
};

/// Latest accepted renewal, in weeks from today
pub const RENEWAL_MAX_WEEKS: i64 = 4;
/// Renewal proposed when the workflow starts without input
pub const RENEWAL_DEFAULT_WEEKS: i64 = 3;

/// Field carrying the renewal date in requests and error bodies
pub const DUE_BACK_FIELD: &str = "due_back";

/// Why a renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("This field is required.")]
    Missing,
    #[error("Enter a valid date.")]
    Malformed,
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

impl From<RenewalError> for AppError {
    fn from(err: RenewalError) -> Self {
        AppError::InvalidField {
            field: DUE_BACK_FIELD,
            message: err.to_string(),
        }
    }
}

/// Parse a submitted `YYYY-MM-DD` renewal date
pub fn parse_renewal_date(raw: Option<&str>) -> Result<NaiveDate, RenewalError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(RenewalError::Missing)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RenewalError::Malformed)
}

/// Accept `date` iff `today <= date <= today + 4 weeks`; the date is returned unchanged.
pub fn validate_renewal_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if date < today {
        return Err(RenewalError::InPast);
    }
    if date > today + Duration::weeks(RENEWAL_MAX_WEEKS) {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(date)
}

/// Due date offered when a librarian opens the renewal form
pub fn proposed_due_back(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(RENEWAL_DEFAULT_WEEKS)
}

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LoanStore>,
}

impl LoansService {
    pub fn new(store: Arc<dyn LoanStore>) -> Self {
        Self { store }
    }

    /// Current local date
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.store
            .find_instance(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Instance to renew and the proposed new due date
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<(BookInstance, NaiveDate)> {
        let instance = self.get_instance(id).await?;
        Ok((instance, proposed_due_back(today)))
    }

    /// Validate and store a submitted due date; nothing is written when validation fails.
    ///
    /// `due_back` is the outcome of reading the submission, so a missing or
    /// malformed date is reported only once the copy is known to exist.
    pub async fn renew(
        &self,
        id: Uuid,
        due_back: Result<NaiveDate, RenewalError>,
        today: NaiveDate,
    ) -> AppResult<NaiveDate> {
        let instance = self.get_instance(id).await?;

        let due_back = match due_back.and_then(|d| validate_renewal_date(d, today)) {
            Ok(date) => date,
            Err(e) => {
                tracing::debug!("Renewal of {} refused: {}", instance.id, e);
                return Err(e.into());
            }
        };

        self.store.set_due_back(instance.id, due_back).await?;
        tracing::info!("Book instance {} renewed until {}", instance.id, due_back);

        Ok(due_back)
    }

    /// Copies on loan to `borrower_id`, earliest due first
    pub async fn borrowed_by(&self, borrower_id: i32, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        self.on_loan(Some(borrower_id), page).await
    }

    /// Every copy on loan, earliest due first
    pub async fn all_borrowed(&self, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        self.on_loan(None, page).await
    }

    async fn on_loan(&self, borrower_id: Option<i32>, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        let pagination = Pagination::requested(page)?;

        let (items, total) = self
            .store
            .list_on_loan(borrower_id, pagination.per_page, pagination.offset())
            .await?;
        pagination.check(total)?;

        Ok(Page {
            items,
            total,
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{LoanStatus, PAGE_SIZE},
        repository::MockLoanStore,
    };
    use mockall::predicate::eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn on_loan(id: Uuid, borrower_id: i32, due_back: NaiveDate) -> BookInstance {
        BookInstance {
            id,
            book_id: Some(1),
            book_title: Some("Book Title".into()),
            language_iso_code: Some("EN".into()),
            due_back: Some(due_back),
            status: LoanStatus::OnLoan,
            borrower_id: Some(borrower_id),
            borrower_username: Some(format!("testuser{}", borrower_id)),
        }
    }

    #[test]
    fn test_rejects_dates_in_the_past() {
        for days in [1, 7, 365] {
            let date = today() - Duration::days(days);
            assert_eq!(validate_renewal_date(date, today()), Err(RenewalError::InPast));
        }
    }

    #[test]
    fn test_rejects_dates_more_than_four_weeks_ahead() {
        for days in [29, 35, 400] {
            let date = today() + Duration::days(days);
            assert_eq!(
                validate_renewal_date(date, today()),
                Err(RenewalError::TooFarAhead)
            );
        }
    }

    #[test]
    fn test_accepts_the_whole_window_unchanged() {
        for days in 0..=28 {
            let date = today() + Duration::days(days);
            assert_eq!(validate_renewal_date(date, today()), Ok(date));
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RenewalError::InPast.to_string(), "Invalid date - renewal in past");
        assert_eq!(
            RenewalError::TooFarAhead.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
        match AppError::from(RenewalError::InPast) {
            AppError::InvalidField { field, .. } => assert_eq!(field, "due_back"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_renewal_date() {
        assert_eq!(
            parse_renewal_date(Some("2024-06-01")),
            Ok(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );
        assert_eq!(parse_renewal_date(None), Err(RenewalError::Missing));
        assert_eq!(parse_renewal_date(Some("  ")), Err(RenewalError::Missing));
        assert_eq!(parse_renewal_date(Some("2024-13-01")), Err(RenewalError::Malformed));
    }

    #[test]
    fn test_proposed_due_back_is_three_weeks_out() {
        assert_eq!(
            proposed_due_back(today()),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn test_renew_stores_valid_date() {
        let id = Uuid::new_v4();
        let new_date = today() + Duration::weeks(2);

        let mut store = MockLoanStore::new();
        store
            .expect_find_instance()
            .with(eq(id))
            .returning(move |id| Ok(Some(on_loan(id, 1, today() + Duration::days(5)))));
        store
            .expect_set_due_back()
            .with(eq(id), eq(new_date))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = LoansService::new(Arc::new(store));
        let submitted = new_date.to_string();
        let stored = service.renew(id, parse_renewal_date(Some(&submitted)), today()).await.unwrap();
        assert_eq!(stored, new_date);
    }

    #[tokio::test]
    async fn test_renew_invalid_date_does_not_write() {
        let id = Uuid::new_v4();

        let mut store = MockLoanStore::new();
        store
            .expect_find_instance()
            .returning(move |id| Ok(Some(on_loan(id, 1, today()))));
        store.expect_set_due_back().times(0);

        let service = LoansService::new(Arc::new(store));

        let past = service.renew(id, parse_renewal_date(Some("2024-05-08")), today()).await;
        assert!(matches!(past, Err(AppError::InvalidField { ref message, .. }) if message == "Invalid date - renewal in past"));

        let future = service.renew(id, parse_renewal_date(Some("2024-06-19")), today()).await;
        assert!(matches!(future, Err(AppError::InvalidField { ref message, .. }) if message == "Invalid date - renewal more than 4 weeks ahead"));

        let missing = service.renew(id, parse_renewal_date(None), today()).await;
        assert!(matches!(missing, Err(AppError::InvalidField { field: "due_back", .. })));

        let malformed = service.renew(id, parse_renewal_date(Some("15/05/2024")), today()).await;
        assert!(matches!(malformed, Err(AppError::InvalidField { ref message, .. }) if message == "Enter a valid date."));
    }

    #[tokio::test]
    async fn test_renew_unknown_instance_is_not_found() {
        let mut store = MockLoanStore::new();
        store.expect_find_instance().returning(|_| Ok(None));
        store.expect_set_due_back().times(0);

        let service = LoansService::new(Arc::new(store));
        let result = service
            .renew(Uuid::new_v4(), Err(RenewalError::Malformed), today())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_renewal_form_proposes_three_weeks() {
        let id = Uuid::new_v4();
        let mut store = MockLoanStore::new();
        store
            .expect_find_instance()
            .returning(move |id| Ok(Some(on_loan(id, 2, today()))));

        let service = LoansService::new(Arc::new(store));
        let (instance, proposed) = service.renewal_form(id, today()).await.unwrap();
        assert_eq!(instance.id, id);
        assert_eq!(proposed, today() + Duration::weeks(3));
    }

    #[tokio::test]
    async fn test_borrowed_by_pages_through_fourteen_loans() {
        // 14 loans for borrower 1: pages of 5, 5 and 4
        let mut store = MockLoanStore::new();
        store
            .expect_list_on_loan()
            .withf(|borrower, limit, _| *borrower == Some(1) && *limit == PAGE_SIZE)
            .returning(|_, limit, offset| {
                let remaining = (14 - offset).clamp(0, limit);
                let items = (0..remaining)
                    .map(|i| on_loan(Uuid::new_v4(), 1, today() + Duration::days(offset + i)))
                    .collect();
                Ok((items, 14))
            });

        let service = LoansService::new(Arc::new(store));

        let mut sizes = Vec::new();
        for page in 1..=3 {
            let result = service.borrowed_by(1, Some(page)).await.unwrap();
            assert_eq!(result.num_pages(), 3);
            assert_eq!(result.total, 14);
            assert!(result.items.iter().all(|i| i.borrower_id == Some(1)));
            sizes.push(result.items.len());
        }
        assert_eq!(sizes, vec![5, 5, 4]);

        let beyond = service.borrowed_by(1, Some(4)).await;
        assert!(matches!(beyond, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_all_borrowed_does_not_filter_by_borrower() {
        let mut store = MockLoanStore::new();
        store
            .expect_list_on_loan()
            .with(eq(None::<i32>), eq(PAGE_SIZE), eq(0i64))
            .times(1)
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let service = LoansService::new(Arc::new(store));
        let page = service.all_borrowed(None).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages(), 1);
    }

    #[tokio::test]
    async fn test_page_zero_is_not_found() {
        let mut store = MockLoanStore::new();
        store.expect_list_on_loan().times(0);

        let service = LoansService::new(Arc::new(store));
        assert!(matches!(
            service.all_borrowed(Some(0)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_huge_page_is_not_found_without_querying() {
        let mut store = MockLoanStore::new();
        store.expect_list_on_loan().times(0);

        let service = LoansService::new(Arc::new(store));
        assert!(matches!(
            service.all_borrowed(Some(i64::MAX)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.borrowed_by(1, Some(i64::MAX)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
