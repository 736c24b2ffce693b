use axum::{Router, routing::get};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers::{diagnostics, export, tattoo};
use crate::state::AppState;

/// JSON API, nested under `/api` and documented in the OpenAPI document.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(tattoo::list_tattoos, tattoo::create_tattoo))
        .routes(routes!(tattoo::delete_tattoo))
        .routes(routes!(tattoo::upload_config))
        .routes(routes!(diagnostics::server_files))
        .layer(tattoo::upload_body_limit())
}

/// Browser-facing pages and downloads outside `/api`.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/download-data", get(export::download_data))
        .route("/uploads-browser", get(diagnostics::uploads_browser))
        .route("/health", get(diagnostics::health))
}
