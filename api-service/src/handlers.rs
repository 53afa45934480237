use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::Identity;
use tracing::{debug, warn};

use crate::extract::Authenticated;
use crate::metrics::ApiMetrics;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn render_metrics(State(metrics): State<Arc<ApiMetrics>>) -> Response {
    match metrics.render() {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Unable to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Protected sample endpoint: echoes the caller's verified claim set.
pub async fn identity(Authenticated(auth): Authenticated) -> Json<Identity> {
    debug!(claims = auth.identity.claims.len(), "serving identity");
    Json(auth.into_identity())
}
