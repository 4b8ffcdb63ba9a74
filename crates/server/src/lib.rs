//! HTTP and WebSocket front for the engine.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use engine::Engine;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub mod config;
mod html;
mod ws;

pub use config::{load_settings, load_settings_from, Settings};

const RECONCILER_JS: &str = include_str!("../assets/reconciler.js");

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, settings: Settings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/websocket", get(ws::ws_handler))
        .route("/assets/reconciler.js", get(reconciler_js))
        .fallback(page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(engine: Arc<Engine>, settings: Settings) -> anyhow::Result<()> {
    let addr: SocketAddr = settings.server_bind.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, pages = engine.pages().len(), "server listening");
    axum::serve(listener, build_router(AppState::new(engine, settings))).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn reconciler_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        RECONCILER_JS,
    )
}

/// First paint for any registered page; everything else is a 404.
async fn page(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    match state.engine.render_initial(path) {
        Some((kind, tree)) => Html(html::render_document(
            &state.settings.page_title,
            path,
            kind.is_interactive(),
            &tree,
        ))
        .into_response(),
        None => {
            debug!(%path, "no page registered");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
