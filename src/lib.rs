//! Session-scoped shopping cart.
//!
//! A cart is identified by a session key and holds one line per
//! (product, size) with an accumulated quantity. Totals use exact decimal
//! arithmetic. Storage is reached only through [`store::CartStore`] and
//! [`store::Catalog`], with Postgres and in-memory implementations.

pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use error::{AppError, AppResult};
pub use models::{Cart, CartContents, CartItem, CartLine, Product, ProductSize};
pub use state::AppState;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    routes::{create_api_router, doc::scalar_docs, health},
};

/// Application router without the transport layers added by `main`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
