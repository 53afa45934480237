#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use api_service::{build_router, AppState};
use axum::Router;
use chrono::{DateTime, Utc};
use common_auth::{Claim, JwtConfig, JwtOptions, TokenDescriptor, TokenIssuer};
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "qqs+CKdh2KQOoXS4asnTaIdu+/DFnfsMIh10u1ODG1Q=";
pub const TEST_JWT_AUDIENCE: &str = "TestAudience";
pub const TEST_JWT_ISSUER: &str = "TestIssuer";
pub const TEST_JWT_EXPIRY_IN_MINUTES: i64 = 5;

pub fn test_options() -> JwtOptions {
    JwtOptions {
        secret: TEST_JWT_SECRET.to_string(),
        issuer: TEST_JWT_ISSUER.to_string(),
        audience: TEST_JWT_AUDIENCE.to_string(),
        expiry_in_minutes: TEST_JWT_EXPIRY_IN_MINUTES,
        clock_skew_seconds: 0,
    }
}

pub fn test_config() -> Arc<JwtConfig> {
    Arc::new(JwtConfig::try_from(test_options()).expect("test jwt config"))
}

pub fn test_app() -> (Router, AppState) {
    let state = AppState::new(test_config()).expect("app state");
    (build_router(state.clone()), state)
}

/// Binds the app to an ephemeral local port and serves it in the background.
pub async fn spawn_server() -> (SocketAddr, AppState) {
    let (app, state) = test_app();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    (addr, state)
}

/// Accumulates claims for a token signed with the test configuration.
pub struct TestToken {
    descriptor: TokenDescriptor,
    config: Arc<JwtConfig>,
}

impl TestToken {
    pub fn new() -> Self {
        Self {
            descriptor: TokenDescriptor::new(Vec::new(), Utc::now()),
            config: test_config(),
        }
    }

    pub fn with_claim(mut self, claim_type: &str, value: &str) -> Self {
        self.descriptor = self.descriptor.with_claim(Claim::new(claim_type, value));
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.descriptor.issued_at = issued_at;
        self
    }

    /// Signs with a different configuration, e.g. a foreign issuer.
    pub fn with_options(mut self, options: JwtOptions) -> Self {
        self.config = Arc::new(JwtConfig::try_from(options).expect("jwt config"));
        self
    }

    pub fn build(&self) -> String {
        TokenIssuer::new(self.config.clone())
            .issue_descriptor(&self.descriptor)
            .expect("sign test token")
    }
}
