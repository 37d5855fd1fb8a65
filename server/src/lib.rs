use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::get, Json, Router};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;
use vsm_core::persist::{load_model, remove_model, save_model, IndexPaths};
use vsm_core::{DocId, DocumentInput, Error, ModelStore, SearchResult};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub documents: Vec<IndexDocument>,
}

#[derive(Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type", default = "default_type")]
    pub doc_type: String,
}
fn default_type() -> String { "text/plain".to_string() }

#[derive(Serialize)]
pub struct IndexResponse {
    pub num_docs: usize,
    pub num_terms: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
    pub paths: IndexPaths,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

/// Router configured from the environment (`ADMIN_TOKEN`, `CORS_ALLOW_ORIGIN`).
pub fn build_app(index_dir: impl Into<PathBuf>) -> Router {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, index endpoints will reject every request");
    }
    build_app_with(index_dir.into(), admin_token)
}

/// Restore the persisted model if there is one and assemble the router.
pub fn build_app_with(index_dir: PathBuf, admin_token: Option<String>) -> Router {
    let paths = IndexPaths::new(&index_dir);
    let model = load_model(&paths);
    match &model {
        Some(m) => tracing::info!(num_docs = m.len(), num_terms = m.num_terms(), "restored model"),
        None => tracing::info!(index = %index_dir.display(), "no persisted model, starting empty"),
    }
    let app_state = AppState { store: Arc::new(ModelStore::with_model(model)), paths, admin_token };

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
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index", axum::routing::post(index_handler).delete(clear_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn error_response(err: Error) -> ApiError {
    let status = match err {
        Error::EmptyCorpus => StatusCode::BAD_REQUEST,
        Error::EmptyModel => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    if params.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "please enter a search query".into()));
    }
    let start = std::time::Instant::now();
    let mut results = state.store.search(&params.q).map_err(error_response)?;
    let total_hits = results.len();
    results.truncate(params.k.clamp(1, 100));

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let not_found = || (StatusCode::NOT_FOUND, format!("document {doc_id} not found"));
    let model = state.store.get().ok_or_else(not_found)?;
    let doc = model.document(&doc_id).ok_or_else(not_found)?;
    Ok(Json(serde_json::json!({
        "doc_id": doc_id,
        "name": doc.name,
        "type": doc.doc_type,
        "content": doc.content,
        "num_terms": doc.tf.len(),
        "magnitude": doc.magnitude,
    })))
}

async fn index_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<IndexRequest>) -> Result<Json<IndexResponse>, ApiError> {
    authorize(&state, &headers)?;
    let documents = collect_documents(req.documents)?;

    // Building is CPU-bound; keep it off the async workers. The slot is
    // written under the build lock so it always matches the live model.
    let store = state.store.clone();
    let paths = state.paths.clone();
    let model = tokio::task::spawn_blocking(move || {
        store.rebuild_with(&documents, |model| {
            if let Err(err) = save_model(&paths, model) {
                tracing::warn!(error = %err, "failed to persist model");
            }
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(error_response)?;

    Ok(Json(IndexResponse { num_docs: model.len(), num_terms: model.num_terms() }))
}

fn collect_documents(docs: Vec<IndexDocument>) -> Result<IndexMap<DocId, DocumentInput>, ApiError> {
    let mut documents: IndexMap<DocId, DocumentInput> = IndexMap::with_capacity(docs.len());
    for doc in docs {
        if doc.content.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, format!("could not extract text from \"{}\"; the document is empty", doc.name)));
        }
        if documents.contains_key(&doc.id) {
            return Err((StatusCode::BAD_REQUEST, format!("duplicate document id \"{}\"", doc.id)));
        }
        documents.insert(doc.id, DocumentInput::new(doc.name, doc.content, doc.doc_type));
    }
    Ok(documents)
}

async fn clear_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state.store.clear_with(|| {
        if let Err(err) = remove_model(&state.paths) {
            tracing::warn!(error = %err, "failed to remove persisted model");
        }
    });
    Ok(StatusCode::NO_CONTENT)
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
