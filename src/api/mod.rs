//! API handlers for the library catalog REST endpoints

pub mod admin;
pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod openapi;
pub mod publishers;

use axum::{
    extract::FromRequest,
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Public router: the catalog API under `/api` plus the OpenAPI documentation
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id", put(books::update_book))
        .route("/books/:id", delete(books::delete_book))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route("/authors", post(authors::create_author))
        .route("/authors/:id", get(authors::get_author))
        .route("/authors/:id", put(authors::update_author))
        .route("/authors/:id", delete(authors::delete_author))
        .route("/authors/:id/books", get(authors::list_author_books))
        // Categories
        .route("/categories", get(categories::list_categories))
        .route("/categories", post(categories::create_category))
        .route("/categories/:id", get(categories::get_category))
        .route("/categories/:id", put(categories::update_category))
        .route("/categories/:id", delete(categories::delete_category))
        .route("/categories/:id/books", get(categories::list_category_books))
        // Publishers
        .route("/publishers", get(publishers::list_publishers))
        .route("/publishers", post(publishers::create_publisher))
        .route("/publishers/:id", get(publishers::get_publisher))
        .route("/publishers/:id", put(publishers::update_publisher))
        .route("/publishers/:id", delete(publishers::delete_publisher))
        .route("/publishers/:id/books", get(publishers::list_publisher_books))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::new())
}

/// Maintenance router, served on its own listener only
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/database/reset", post(admin::reset_database))
        .route("/database/force-reset", post(admin::force_reset_database))
        .route("/database/status", get(admin::database_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

/// JSON body extractor whose failures use the application error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 201 response carrying the new resource and its `Location`
pub(crate) fn created<T: Serialize>(collection: &str, id: i32, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(LOCATION, format!("/api/{}/{}", collection, id))],
        Json(body),
    )
        .into_response()
}

/// Updates must address the same id in the path and in the body
pub(crate) fn ensure_same_id(path_id: i32, body_id: i32) -> Result<(), AppError> {
    if path_id != body_id {
        return Err(AppError::IdMismatch { path_id, body_id });
    }
    Ok(())
}

/// 200 with the entity, or 404 naming it
pub(crate) fn found<T>(entity: &str, id: i32, value: Option<T>) -> Result<Json<T>, AppError> {
    value
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} with ID {} not found", entity, id)))
}

/// 204 when something was deleted, 404 otherwise
pub(crate) fn deleted(entity: &str, id: i32, removed: bool) -> Result<StatusCode, AppError> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("{} with ID {} not found", entity, id)))
    }
}
