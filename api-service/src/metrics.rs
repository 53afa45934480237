use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus registry for the bearer-auth boundary.
///
/// `auth_token_validations_total` carries one `outcome` label per request
/// that reached a protected route: `accepted`, `missing_header`,
/// `invalid_header`, or one of the `Rejection::reason` labels
/// (`malformed`, `invalid_signature`, `invalid_issuer`, `invalid_audience`,
/// `expired`, `not_yet_valid`).
#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    token_validations: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let token_validations = IntCounterVec::new(
            Opts::new(
                "auth_token_validations_total",
                "Count of bearer token checks grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(token_validations.clone()))?;

        Ok(Self {
            registry,
            token_validations,
        })
    }

    /// Counts one validation attempt under `outcome`.
    pub fn token_validation(&self, outcome: &str) {
        self.token_validations.with_label_values(&[outcome]).inc();
    }

    /// Current count for `outcome`; zero if it was never recorded.
    pub fn validation_count(&self, outcome: &str) -> u64 {
        self.token_validations.with_label_values(&[outcome]).get()
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
