use crate::config::AppConfig;
use crate::detail::{self, DetailFragment};
use crate::page::INDEX_HTML;
use crate::selection::{ClickEvent, SelectionState, SessionId, SessionStore};
use crate::table::{self, Row};
use crate::types::Dataset;
use crate::view::{self, MapView};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub const SESSION_HEADER: &str = "x-session-id";

pub struct AppState {
    pub dataset: Dataset,
    pub view: MapView,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: &AppConfig, dataset: Dataset) -> Self {
        let view = view::compose(&dataset, &config.map);
        Self {
            dataset,
            view,
            sessions: SessionStore::new(),
        }
    }

    /// Both panels for one selection state.
    pub fn panels(&self, state: &SelectionState) -> SelectResponse {
        let fragment = detail::render(state);
        let rows = table::render(state, &self.dataset.cases);
        SelectResponse {
            detail_html: fragment.to_html(),
            table_html: table::to_html(&rows),
            detail: fragment,
            table: rows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub detail: DetailFragment,
    pub detail_html: String,
    pub table: Vec<Row>,
    pub table_html: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/map", get(map_handler))
        .route("/api/selection", get(selection_handler))
        .route("/select", post(select_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, dataset: Dataset) -> Result<()> {
    let state = Arc::new(AppState::new(&config, dataset));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    info!("Starting server on http://{}", addr);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn session_of(headers: &HeaderMap) -> SessionId {
    SessionId::from_header(headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Json<MapView> {
    Json(state.view.clone())
}

async fn selection_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SelectResponse> {
    let session = session_of(&headers);
    Json(state.panels(&state.sessions.get(&session)))
}

/// The body is read as raw bytes so that any payload, even one that is not
/// JSON, still produces a rendered (fallback) selection.
async fn select_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<SelectResponse> {
    let session = session_of(&headers);
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Unreadable click payload ({}), using fallbacks", e);
        serde_json::Value::Null
    });
    let event = ClickEvent::from_json(&payload);
    debug!(session = session.as_str(), ?event, "Map click");

    let selection = state.sessions.select(&session, event);
    Json(state.panels(&selection))
}

async fn health_handler() -> &'static str {
    "OK"
}
