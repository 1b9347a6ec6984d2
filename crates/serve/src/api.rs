//! API routes for Plugdir serve crate

use crate::handlers::*;
use crate::middleware::moderator_key_middleware;
use axum::{
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Prefix every route is mounted under
pub const API_PREFIX: &str = "/api";

/// Full API router with state attached
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, api_routes(&state))
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/plugins", get(handle_search))
        .route("/plugins/:slug", get(handle_get_plugin))
        .route(
            "/plugins/:slug/category/:category",
            put(handle_update_category),
        )
        .route(
            "/plugins/:slug/tags",
            post(handle_update_tags).put(handle_update_tags),
        )
        .route("/tags", get(handle_list_tags))
        .route("/categories", get(handle_list_categories))
        .route("/submit", post(handle_submit))
        .merge(moderation_routes(state))
}

/// Submission moderation routes, guarded by the moderator key
fn moderation_routes(state: &AppState) -> Router<AppState> {
    let keys: Arc<HashSet<String>> =
        Arc::new(state.config.moderator_keys.iter().cloned().collect());

    Router::new()
        .route("/submitted-plugins", get(handle_list_submissions))
        .route(
            "/submitted-plugins/:id",
            get(handle_get_submission).delete(handle_delete_submission),
        )
        .route(
            "/submitted-plugins/:id/approve",
            post(handle_approve_submission),
        )
        .route_layer(middleware::from_fn(move |req, next| {
            moderator_key_middleware(keys.clone(), req, next)
        }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
