use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::check::CheckResult;
use crate::store::ResultStore;

#[derive(Clone)]
struct AppState {
    identity: Arc<str>,
    store: ResultStore,
}

#[derive(Deserialize)]
struct StatusOfParams {
    service: Option<String>,
}

/// Read-only query surface over a [`ResultStore`], shared by agent and scraper.
#[derive(Clone)]
pub struct StatusServer {
    pub listen: String,
    pub identity: String,
    pub store: ResultStore,
}

impl StatusServer {
    pub fn new(listen: impl Into<String>, identity: impl Into<String>, store: ResultStore) -> Self {
        Self {
            listen: listen.into(),
            identity: identity.into(),
            store,
        }
    }

    /// Bind `listen` and serve until `token` is cancelled.
    pub async fn start(&self, token: CancellationToken) -> Result<()> {
        // Convert localhost to 127.0.0.1 for proper parsing
        let listen = self.listen.replacen("localhost", "127.0.0.1", 1);
        let addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.listen))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener, token).await
    }

    /// Serve on an already bound listener until `token` is cancelled.
    pub async fn serve(&self, listener: TcpListener, token: CancellationToken) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("🌐 {} listening on http://{}", self.identity, addr);

        axum::serve(listener, self.create_app())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!("🛑 {} stopped listening on {}", self.identity, addr);
        Ok(())
    }

    pub fn create_app(&self) -> Router {
        let state = AppState {
            identity: Arc::from(self.identity.as_str()),
            store: self.store.clone(),
        };

        Router::new()
            .route("/whoareyou", get(who_are_you))
            .route("/ping", get(ping))
            .route("/checks", get(checks))
            .route("/checkandclear", get(check_and_clear))
            .route("/statusof", get(status_of))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
    }
}

async fn who_are_you(State(state): State<AppState>) -> String {
    state.identity.to_string()
}

async fn ping() -> &'static str {
    "pong"
}

async fn checks(State(state): State<AppState>) -> Json<Vec<CheckResult>> {
    Json(state.store.list().await)
}

async fn check_and_clear(State(state): State<AppState>) -> Json<Vec<CheckResult>> {
    let drained = state.store.drain().await;
    debug!("Drained {} results", drained.len());
    Json(drained)
}

async fn status_of(
    State(state): State<AppState>,
    Query(params): Query<StatusOfParams>,
) -> Response {
    let service = params.service.unwrap_or_default();
    match state.store.query(&service).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
