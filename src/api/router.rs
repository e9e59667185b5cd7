//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Request id → 3. Audit logger

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::complaints::analyze))
        .route("/complaints", get(endpoints::complaints::list))
        .route("/complaints/:id", get(endpoints::complaints::detail))
        .route("/complaints/:id/edit", patch(endpoints::complaints::edit_reply))
        .route(
            "/complaints/:id/edit-history",
            get(endpoints::complaints::edit_history),
        )
        .route("/complaints/:id/approve", post(endpoints::complaints::approve))
        .route("/complaints/:id/reject", post(endpoints::complaints::reject))
        .with_state(ctx)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::request_id::assign))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", routes)
}
