//! Request middleware for Plugdir serve crate

use crate::error::ErrorResponse;
use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::collections::HashSet;
use std::sync::Arc;

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Moderator key required".to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Moderator key authentication middleware
///
/// Requires `Authorization: Bearer <key>` with one of `valid_keys`. An
/// empty key set lets every request through.
///
/// # Errors
///
/// Answers HTTP 401 when the key is missing or unknown
///
/// # Examples
///
/// ```no_run
/// use std::collections::HashSet;
/// use std::sync::Arc;
/// use axum::{middleware, Router};
/// use plugdir_serve::middleware::moderator_key_middleware;
///
/// let keys = Arc::new(HashSet::from(["moderator-key".to_string()]));
///
/// let app: Router = Router::new().layer(middleware::from_fn(move |req, next| {
///     moderator_key_middleware(keys.clone(), req, next)
/// }));
/// ```
pub async fn moderator_key_middleware(
    valid_keys: Arc<HashSet<String>>,
    request: Request,
    next: Next,
) -> Response {
    if valid_keys.is_empty() {
        return next.run(request).await;
    }

    let key = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match key {
        Some(key) if valid_keys.contains(key) => {
            tracing::debug!("Moderator key accepted");
            next.run(request).await
        }
        Some(key) => {
            tracing::warn!(
                key_prefix = &key[..key.len().min(4)],
                "Rejected unknown moderator key"
            );
            unauthorized()
        }
        None => {
            tracing::warn!("Missing moderator key on {}", request.uri().path());
            unauthorized()
        }
    }
}
