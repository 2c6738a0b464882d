//! Book instance (copy) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{CreateBookInstance, UpdateBookInstance},
        BookInstanceDetails,
    },
    services::loans::LoansService,
};

use super::Librarian;

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Book instance created", body = BookInstanceDetails),
        (status = 400, description = "Unknown borrower"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    _: Librarian,
    Path(book_id): Path<i32>,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    let instance = state.services.catalog.create_instance(book_id, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookInstanceDetails::new(instance, LoansService::today())),
    ))
}

/// Get a book instance
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Book instance", body = BookInstanceDetails),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.catalog.get_instance(id).await?;
    Ok(Json(BookInstanceDetails::new(instance, LoansService::today())))
}

/// Edit status, due date or borrower of a book instance
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstanceDetails),
        (status = 400, description = "Unknown borrower"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    _: Librarian,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.catalog.update_instance(id, data).await?;
    Ok(Json(BookInstanceDetails::new(instance, LoansService::today())))
}

/// Delete a book instance
#[utoipa::path(
    delete,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Book instance deleted"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    _: Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
