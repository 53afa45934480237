use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue};
use tracing::debug;

use crate::claims::Identity;
use crate::error::{AuthError, AuthResult};
use crate::validator::TokenValidator;

/// Extracts the verified identity from an `Authorization: Bearer` header
/// using the [`TokenValidator`] held in router state.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub token: String,
}

impl AuthContext {
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.identity.has_claim(claim_type, value)
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenValidator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let validator = Arc::<TokenValidator>::from_ref(state);

        let header_value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = parse_bearer(header_value)?;
        let identity = validator.validate(&token).inspect_err(|rejection| {
            debug!(
                reason = rejection.reason(),
                path = %parts.uri.path(),
                "bearer token rejected"
            );
        })?;

        Ok(Self { identity, token })
    }
}

fn parse_bearer(value: &HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let (scheme, token) = raw
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthorization)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidAuthorization);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
