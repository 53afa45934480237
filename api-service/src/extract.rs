use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use common_auth::{AuthContext, AuthError, TokenValidator};

use crate::metrics::ApiMetrics;

/// [`AuthContext`] that also counts the outcome of every bearer check.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    Arc<TokenValidator>: FromRef<S>,
    Arc<ApiMetrics>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let metrics = Arc::<ApiMetrics>::from_ref(state);
        match AuthContext::from_request_parts(parts, state).await {
            Ok(context) => {
                metrics.token_validation("accepted");
                Ok(Self(context))
            }
            Err(err) => {
                metrics.token_validation(err.reason());
                Err(err)
            }
        }
    }
}
