//! HTTP handlers for Plugdir serve crate

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::ServerConfig;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    Form,
};
use plugdir_core::moderation::{ModerationQueue, PluginSubmission, SubmitOutcome};
use plugdir_core::search::{SearchEngine, SearchPage};
use plugdir_core::store::{self, Stores};
use plugdir_core::types::{Category, Plugin, SubmissionId, SubmittedPlugin, Tag};
use plugdir_core::{PlugdirConfig, Result};
use plugdir_infra::{NotifierConfig, SubmissionNotifier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

/// Where the submit form sends the browser after a successful submission
pub const SUBMIT_REDIRECT: &str = "/thanks-for-submitting";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub cache: Arc<CatalogCache>,
    pub engine: SearchEngine,
    pub moderation: ModerationQueue,
    pub notifier: Option<Arc<SubmissionNotifier>>,
    pub config: ServerConfig,
}

impl AppState {
    /// Create application state over already opened stores
    pub fn new(stores: Stores, config: &PlugdirConfig) -> Result<Self> {
        let notifier = NotifierConfig::from_settings(&config.notify)
            .map(SubmissionNotifier::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            moderation: ModerationQueue::new(stores.submissions.clone()),
            cache: Arc::new(CatalogCache::new(&config.cache)),
            engine: SearchEngine::new(config.cache.keyword_pattern_capacity),
            notifier,
            config: ServerConfig::from(&config.server),
            stores,
        })
    }

    /// Open the configured stores and build state over them
    pub async fn from_config(config: &PlugdirConfig) -> Result<Self> {
        let stores = store::open(&config.database).await?;
        Self::new(stores, config)
    }
}

/// Query parameters of `/plugins`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub page: Option<String>,
}

impl SearchParams {
    /// Requested page, defaulting to 1
    pub fn page(&self) -> std::result::Result<usize, ApiError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::bad_request(format!("Invalid page {}", raw))),
        }
    }
}

/// Handler for plugin search
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<Arc<SearchPage>>, ApiError> {
    let page = params.page()?;
    let query = params.query.as_str();

    let generation = state.cache.generation();

    if let Some(cached) = state.cache.cached_page(generation, query, page).await {
        return Ok(Json(cached));
    }

    let snapshot = state
        .cache
        .snapshot_at(generation, state.stores.plugins.as_ref())
        .await?;
    let result = Arc::new(state.engine.search(&snapshot, query, page));
    info!(
        "Search query={:?} page={} matched {} plugins",
        query, page, result.total_results
    );

    state
        .cache
        .store_page(generation, query, page, result.clone())
        .await;
    Ok(Json(result))
}

/// Handler for a single plugin
pub async fn handle_get_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> std::result::Result<Json<Plugin>, ApiError> {
    state
        .stores
        .plugins
        .get_plugin(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("plugin with slug {}", slug)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category: String,
}

/// Handler for changing a plugin's category
pub async fn handle_update_category(
    State(state): State<AppState>,
    Path((slug, category)): Path<(String, String)>,
) -> std::result::Result<Json<CategoryResponse>, ApiError> {
    let plugins = state.stores.plugins.as_ref();

    if plugins.get_plugin(&slug).await?.is_none() {
        return Err(ApiError::not_found(format!("plugin with slug {}", slug)));
    }

    let categories = state.cache.categories(plugins).await?;
    if !categories.iter().any(|c| c.id == category) {
        return Err(ApiError::bad_request(format!("No such category {}", category)));
    }

    let plugin = plugins.update_category(&slug, &category).await?;
    state.cache.invalidate_plugins().await;
    info!("Set category of {} to {}", slug, category);

    Ok(Json(CategoryResponse {
        category: plugin.category.unwrap_or(category),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: BTreeSet<String>,
}

/// Handler for replacing a plugin's tags
///
/// Tags are trimmed and lowercased so they line up with search tokens.
pub async fn handle_update_tags(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<TagsRequest>,
) -> std::result::Result<Json<TagsResponse>, ApiError> {
    let plugins = state.stores.plugins.as_ref();

    if plugins.get_plugin(&slug).await?.is_none() {
        return Err(ApiError::not_found(format!("plugin with slug {}", slug)));
    }

    let tags: BTreeSet<String> = request
        .tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    let plugin = plugins.update_tags(&slug, tags).await?;
    state.cache.invalidate_plugins().await;
    info!("Replaced tags of {} ({} tags)", slug, plugin.tags.len());

    Ok(Json(TagsResponse { tags: plugin.tags }))
}

/// Handler for the tag reference list
pub async fn handle_list_tags(
    State(state): State<AppState>,
) -> std::result::Result<Json<Arc<Vec<Tag>>>, ApiError> {
    Ok(Json(
        state.cache.tag_list(state.stores.plugins.as_ref()).await?,
    ))
}

/// Handler for the category reference list
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> std::result::Result<Json<Arc<Vec<Category>>>, ApiError> {
    Ok(Json(
        state
            .cache
            .category_list(state.stores.plugins.as_ref())
            .await?,
    ))
}

/// Outcome of a form submission
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Handler for plugin submissions
///
/// A duplicate external link is answered with `status: false` rather than
/// an error status.
pub async fn handle_submit(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> std::result::Result<Json<SubmitResponse>, ApiError> {
    let submission = PluginSubmission::from_form(form)?;

    match state.moderation.submit(submission).await? {
        SubmitOutcome::Duplicate => Ok(Json(SubmitResponse {
            status: false,
            message: Some("This plugin has already been submitted.".to_string()),
            redirect: None,
        })),
        SubmitOutcome::Accepted(record) => {
            if let Some(notifier) = state.notifier.clone() {
                tokio::spawn(async move { notifier.notify(&record).await });
            }

            Ok(Json(SubmitResponse {
                status: true,
                message: None,
                redirect: Some(SUBMIT_REDIRECT.to_string()),
            }))
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionListResponse {
    pub list: Vec<SubmittedPlugin>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub plugin: SubmittedPlugin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: bool,
}

fn parse_submission_id(raw: &str) -> std::result::Result<SubmissionId, ApiError> {
    raw.parse().map_err(|_| {
        warn!("Malformed submission id {:?}", raw);
        ApiError::not_found(format!("submitted plugin {}", raw))
    })
}

/// Handler for the pending submission list
pub async fn handle_list_submissions(
    State(state): State<AppState>,
) -> std::result::Result<Json<SubmissionListResponse>, ApiError> {
    let list = state.moderation.list_pending().await?;
    Ok(Json(SubmissionListResponse { list }))
}

/// Handler for a single submission
pub async fn handle_get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<SubmissionResponse>, ApiError> {
    let plugin = state.moderation.get(parse_submission_id(&id)?).await?;
    Ok(Json(SubmissionResponse { plugin }))
}

/// Handler for approving a submission
pub async fn handle_approve_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<StatusResponse>, ApiError> {
    state.moderation.approve(parse_submission_id(&id)?).await?;
    Ok(Json(StatusResponse { status: true }))
}

/// Handler for deleting a submission
pub async fn handle_delete_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<StatusResponse>, ApiError> {
    state.moderation.delete(parse_submission_id(&id)?).await?;
    Ok(Json(StatusResponse { status: true }))
}
