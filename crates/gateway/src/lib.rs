//! HTTP API gateway for the Tensive repair assistant.
//!
//! Sessions live in memory only. Each request looks up (or creates) a
//! [`ChatSession`], releases the session map, and then works on that
//! session alone, so slow model calls never block other conversations.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tensive_agent::{ChatSession, Orchestrator};
use tensive_knowledge::KnowledgeStore;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Maximum number of live sessions before the least recently used is evicted.
pub const MAX_SESSIONS: usize = 1_000;

/// Request body limit. Inline base64 photos from phones run to several MB.
pub const BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

struct SessionSlot {
    session: Arc<ChatSession>,
    last_used: Instant,
}

/// Shared state for all routes.
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    sessions: RwLock<HashMap<String, SessionSlot>>,
    max_sessions: usize,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    /// Fetch a session, creating it when `id` is absent or unknown.
    pub async fn session(&self, id: Option<String>) -> Arc<ChatSession> {
        let mut sessions = self.sessions.write().await;

        if let Some(slot) = id.as_ref().and_then(|id| sessions.get_mut(id)) {
            slot.last_used = Instant::now();
            return slot.session.clone();
        }

        if sessions.len() >= self.max_sessions {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone())
            {
                sessions.remove(&oldest);
                info!(session = %oldest, "Evicted least recently used session");
            }
        }

        let session = Arc::new(match id {
            Some(id) => ChatSession::with_id(self.orchestrator.clone(), id),
            None => ChatSession::new(self.orchestrator.clone()),
        });
        sessions.insert(
            session.id().to_string(),
            SessionSlot {
                session: session.clone(),
                last_used: Instant::now(),
            },
        );
        session
    }

    /// Look up an existing session without creating one.
    pub async fn existing(&self, id: &str) -> Option<Arc<ChatSession>> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|slot| slot.session.clone())
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Build the router with all routes and layers.
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: tensive_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No API key configured; model calls will fail until one is set");
    }

    let router = tensive_providers::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| format!("provider '{}' is not available", config.default_provider))?;

    match provider.health_check().await {
        Ok(true) => info!(provider = provider.name(), "Provider reachable"),
        Ok(false) => warn!(provider = provider.name(), "Provider health check failed"),
        Err(e) => warn!(provider = provider.name(), error = %e, "Provider unreachable"),
    }

    let knowledge = KnowledgeStore::load(config.knowledge.path.as_deref().map(std::path::Path::new))?;
    let orchestrator = Arc::new(Orchestrator::from_config(
        &config,
        provider,
        Arc::new(knowledge),
    ));

    let state = Arc::new(GatewayState::new(orchestrator));
    let app = build_router(state, &config.gateway.allowed_origins);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
