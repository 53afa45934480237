use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use common_auth::{JwtConfig, TokenValidator};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{health, identity, render_metrics};
use crate::metrics::ApiMetrics;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub token_validator: Arc<TokenValidator>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(config: Arc<JwtConfig>) -> Result<Self> {
        Ok(Self {
            token_validator: Arc::new(TokenValidator::new(config)),
            metrics: Arc::new(ApiMetrics::new()?),
        })
    }
}

impl FromRef<AppState> for Arc<TokenValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.token_validator.clone()
    }
}

impl FromRef<AppState> for Arc<ApiMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(render_metrics))
        .route("/identity", get(identity))
        .with_state(state)
        .layer(cors)
}
