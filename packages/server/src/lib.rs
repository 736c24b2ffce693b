pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

use axum::Router;
use axum::http::{HeaderValue, Method};
use common::storage::StorageKind;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkfolio API",
        version = "1.0.0",
        description = "Collects tattoo submissions (image, price, duration, tags) and \
            reconciles stored images against records"
    ),
    tags(
        (name = "Tattoos", description = "Submitting, listing and deleting tattoo records"),
        (name = "Diagnostics", description = "Read-only storage reconciliation"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allow_origins.is_empty() {
        return None;
    }

    let origin = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_origin(origin)
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(config.max_age)),
    )
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let mut router = api_router
        .merge(routes::page_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api));

    let prefix = config.storage.local.public_prefix.trim_end_matches('/');
    if state.blobs.kind() == StorageKind::Local && !prefix.is_empty() {
        router = router.nest_service(prefix, ServeDir::new(&config.storage.local.uploads_dir));
    }

    let mut router = router
        .fallback_service(ServeDir::new(&config.server.public_dir))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::shape_error_responses,
        ));

    if let Some(cors) = cors_layer(&config.server.cors) {
        router = router.layer(cors);
    }

    router.with_state(state)
}
