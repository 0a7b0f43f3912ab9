//! Publishers API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        publisher::{CreatePublisher, UpdatePublisher},
        BookDto, PublisherDto,
    },
    AppState,
};

use super::{created, AppJson, deleted, ensure_same_id, found};

/// List all publishers
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "publishers",
    responses(
        (status = 200, description = "Publishers list", body = Vec<PublisherDto>)
    )
)]
pub async fn list_publishers(State(state): State<AppState>) -> AppResult<Json<Vec<PublisherDto>>> {
    let publishers = state.services.publishers.list().await?;
    Ok(Json(publishers))
}

/// Get publisher by ID
#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i32, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher details", body = PublisherDto),
        (status = 404, description = "Publisher not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_publisher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PublisherDto>> {
    let publisher = state.services.publishers.get_by_id(id).await?;
    found("Publisher", id, publisher)
}

/// Create a publisher
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "publishers",
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = PublisherDto),
        (status = 400, description = "Invalid publisher", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreatePublisher>,
) -> AppResult<Response> {
    let publisher = state.services.publishers.create(data).await?;
    Ok(created("publishers", publisher.id, publisher))
}

/// Rename a publisher
#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i32, Path, description = "Publisher ID")),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = PublisherDto),
        (status = 400, description = "Invalid publisher or ID mismatch", body = crate::error::ErrorResponse),
        (status = 404, description = "Publisher not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_publisher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(data): AppJson<UpdatePublisher>,
) -> AppResult<Json<PublisherDto>> {
    ensure_same_id(id, data.id)?;
    let publisher = state.services.publishers.update(data).await?;
    Ok(Json(publisher))
}

/// Delete a publisher; fails while books still reference it
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "publishers",
    params(("id" = i32, Path, description = "Publisher ID")),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 400, description = "Invalid ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Publisher not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Publisher still referenced by books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_publisher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let removed = state.services.publishers.delete(id).await?;
    deleted("Publisher", id, removed)
}

/// List the books issued by a publisher
#[utoipa::path(
    get,
    path = "/publishers/{id}/books",
    tag = "publishers",
    params(("id" = i32, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Books from the publisher", body = Vec<BookDto>),
        (status = 404, description = "Publisher not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_publisher_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.services.books.list_by_publisher(id).await?;
    Ok(Json(books))
}
