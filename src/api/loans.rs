//! Loan endpoints: borrowed-book listings and the librarian renewal workflow

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Redirect,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookInstanceDetails, PageQuery},
    services::loans::{parse_renewal_date, LoansService, RenewalError},
};

use super::{AuthenticatedUser, Librarian, PaginatedResponse};

/// Where a successful renewal sends the librarian
pub const ALL_BORROWED_PATH: &str = "/api/v1/loans";

/// Renewal form: the copy and the proposed due date
#[derive(Serialize, ToSchema)]
pub struct RenewalForm {
    pub instance: BookInstanceDetails,
    /// Today plus three weeks
    pub proposed_due_back: NaiveDate,
}

/// Renewal submission
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    /// New due date (YYYY-MM-DD), between today and four weeks ahead
    #[serde(default)]
    pub due_back: Option<String>,
}

/// Books on loan to the current user, earliest due first
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Books borrowed by the current user", body = PaginatedResponse<BookInstanceDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let today = LoansService::today();
    let page = state
        .services
        .loans
        .borrowed_by(claims.user_id, query.page)
        .await?
        .map(|i| BookInstanceDetails::new(i, today));

    Ok(Json(page.into()))
}

/// Every book on loan, with its borrower (librarian only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All borrowed books", body = PaginatedResponse<BookInstanceDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    _: Librarian,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let today = LoansService::today();
    let page = state
        .services
        .loans
        .all_borrowed(query.page)
        .await?
        .map(|i| BookInstanceDetails::new(i, today));

    Ok(Json(page.into()))
}

/// Start a renewal: the copy and a proposed due date three weeks out
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalForm),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    _: Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalForm>> {
    let today = LoansService::today();
    let (instance, proposed_due_back) = state.services.loans.renewal_form(id, today).await?;

    Ok(Json(RenewalForm {
        instance: BookInstanceDetails::new(instance, today),
        proposed_due_back,
    }))
}

/// Renew a book instance, then redirect to the all-borrowed listing
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 303, description = "Renewed, redirect to all borrowed books"),
        (status = 400, description = "Invalid renewal date", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    _: Librarian,
    Path(id): Path<Uuid>,
    body: Result<Json<RenewRequest>, JsonRejection>,
) -> AppResult<Redirect> {
    // A body that cannot be read is reported on the date field, after the copy lookup
    let due_back = match body {
        Ok(Json(request)) => parse_renewal_date(request.due_back.as_deref()),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(RenewalError::Missing),
        Err(_) => Err(RenewalError::Malformed),
    };

    state
        .services
        .loans
        .renew(id, due_back, LoansService::today())
        .await?;

    Ok(Redirect::to(ALL_BORROWED_PATH))
}
