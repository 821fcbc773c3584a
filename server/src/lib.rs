use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use recommender::image::resolve_image_url;
use recommender::persist::{load_snapshot, SnapshotPaths};
use recommender::{rank, Post, PostId, RecommendError, SharedCatalog, Strategy, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

pub const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub location: Option<String>,
    /// Comma or space separated.
    #[serde(default)]
    pub hashtags: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub mode: Option<String>,
}
fn default_k() -> usize { DEFAULT_LIMIT }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub location: Option<String>,
    pub hashtags: Vec<String>,
    pub mode: Strategy,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RecommendHit>,
}

#[derive(Serialize)]
pub struct RecommendHit {
    pub post_id: PostId,
    pub score: usize,
    pub distance: Option<f32>,
    pub location: String,
    pub title: Option<String>,
    pub hashtags: Vec<String>,
    pub image_ref: String,
    pub image_url: String,
}

#[derive(Serialize)]
pub struct PostView {
    pub post_id: PostId,
    pub location: String,
    pub title: Option<String>,
    pub hashtags: Vec<String>,
    pub image_ref: String,
    pub image_url: String,
}

impl PostView {
    fn new(post: &Post, image_base_url: Option<&str>) -> Self {
        Self {
            post_id: post.id,
            location: post.location.clone(),
            title: post.title.clone(),
            hashtags: post.hashtags.iter().cloned().collect(),
            image_ref: post.image_ref.clone(),
            image_url: resolve_image_url(image_base_url, &post.image_ref),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog_root: PathBuf,
    pub catalog: SharedCatalog,
    pub admin_token: Option<String>,
    pub image_base_url: Option<String>,
}

type ApiError = (StatusCode, String);

pub fn build_app(catalog_dir: String, image_base_url: Option<String>) -> Result<Router> {
    // Load snapshot at startup
    let catalog = load_snapshot(&SnapshotPaths::new(&catalog_dir))?;
    tracing::info!(num_posts = catalog.len(), catalog_dir, "catalog snapshot loaded");
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { catalog_root: PathBuf::from(&catalog_dir), catalog: SharedCatalog::new(catalog), admin_token, image_base_url };
    Ok(router(app_state))
}

/// Routes and layers over an already-loaded state.
pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/locations", get(locations_handler))
        .route("/hashtags", get(hashtags_handler))
        .route("/recommend", get(recommend_handler))
        .route("/post/:post_id", get(post_handler))
        .route("/catalog/reload", post(reload_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn locations_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.current().all_locations().into_iter().collect())
}

pub async fn hashtags_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.current().all_hashtags())
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let mode = match params.mode.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(m) => m.parse::<Strategy>().map_err(bad_request)?,
        None => Strategy::default(),
    };
    if params.k == 0 {
        return Err(bad_request(RecommendError::InvalidArgument("k must be a positive integer".into())));
    }
    let k = params.k.min(MAX_K);

    let query = recommender::Query::new(params.location.as_deref(), &params.hashtags);
    // hold one catalog for the whole request, even if a reload lands meanwhile
    let catalog = state.catalog.current();
    let ranked = rank(&catalog, &query, mode);
    let total_hits = ranked.len();

    let results: Vec<RecommendHit> = ranked
        .into_iter()
        .take(k)
        .map(|hit| RecommendHit {
            post_id: hit.post.id,
            score: hit.score,
            distance: hit.distance,
            location: hit.post.location.clone(),
            title: hit.post.title.clone(),
            hashtags: hit.post.hashtags.iter().cloned().collect(),
            image_ref: hit.post.image_ref.clone(),
            image_url: resolve_image_url(state.image_base_url.as_deref(), &hit.post.image_ref),
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(RecommendResponse {
        location: query.location,
        hashtags: query.hashtags.into_iter().collect(),
        mode,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn post_handler(State(state): State<AppState>, Path(post_id): Path<PostId>) -> Result<Json<PostView>, ApiError> {
    let catalog = state.catalog.current();
    catalog
        .get(post_id)
        .map(|p| Json(PostView::new(p, state.image_base_url.as_deref())))
        .ok_or((StatusCode::NOT_FOUND, "not found".into()))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let root = state.catalog_root.clone();
    // build the replacement fully before swapping it in
    let catalog = load_snapshot(&SnapshotPaths::new(&root)).map_err(|e| {
        tracing::warn!(error = %e, "catalog reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e}"))
    })?;
    let num_posts = catalog.len();
    let previous = state.catalog.replace(catalog);
    tracing::info!(num_posts, previous = previous.len(), "catalog reloaded");
    Ok(Json(serde_json::json!({ "num_posts": num_posts })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

fn bad_request(err: RecommendError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}
