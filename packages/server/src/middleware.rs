//! Response shaping shared by every route.

use std::any::Any;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

const FALLBACK_ERROR_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Something went wrong</title></head>\n<body><h1>Something went wrong</h1><p>The server hit an unexpected error. <a href=\"/\">Back to the start page</a>.</p></body>\n</html>\n";

/// Set on responses produced by [`handle_panic`].
#[derive(Clone, Copy, Debug)]
struct Panicked;

/// Turn a handler panic into a generic 500 instead of dropping the connection.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    let mut response = AppError::Internal(format!("handler panicked: {detail}")).into_response();
    response.extensions_mut().insert(Panicked);
    response
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn has_content_type(response: &Response, prefix: &str) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(prefix))
}

/// Unknown `/api` routes answer with a JSON 404. Outside `/api`, panics and
/// server errors without a JSON or HTML body answer with the static error
/// page; a handler's own JSON 5xx (the degraded `/health` report) is kept.
pub async fn shape_error_responses(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    let status = response.status();

    if is_api_path(&path) {
        if status == StatusCode::NOT_FOUND && !has_content_type(&response, "application/json") {
            return AppError::NotFound(format!("No API route for {path}")).into_response();
        }
        return response;
    }

    let panicked = response.extensions().get::<Panicked>().is_some();
    let deliberate = has_content_type(&response, "text/html")
        || (has_content_type(&response, "application/json") && !panicked);
    if status.is_server_error() && !deliberate {
        let page = state.config.server.public_dir.join("error.html");
        let body = match tokio::fs::read_to_string(&page).await {
            Ok(html) => html,
            Err(e) => {
                error!(path = %page.display(), error = %e, "Error page unavailable");
                FALLBACK_ERROR_PAGE.to_string()
            }
        };
        let mut shaped = (status, Html(body)).into_response();
        shaped
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        return shaped;
    }

    response
}
