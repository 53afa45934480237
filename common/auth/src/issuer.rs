use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};
use tracing::debug;

use crate::claims::Claim;
use crate::config::JwtConfig;
use crate::error::IssueError;

/// Everything needed for one issuance: the caller's claims and when the
/// token counts as issued. Issuer, audience, key and lifetime come from
/// the [`JwtConfig`] of the issuing [`TokenIssuer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub claims: Vec<Claim>,
    pub issued_at: DateTime<Utc>,
}

impl TokenDescriptor {
    pub fn new(claims: Vec<Claim>, issued_at: DateTime<Utc>) -> Self {
        Self { claims, issued_at }
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self, config: &JwtConfig) -> Option<DateTime<Utc>> {
        self.issued_at.checked_add_signed(config.expiry())
    }
}

/// Mints HS256 tokens that [`crate::TokenValidator`] accepts under the same config.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<JwtConfig>,
    key: EncodingKey,
    header: Header,
}

impl TokenIssuer {
    pub fn new(config: Arc<JwtConfig>) -> Self {
        let key = EncodingKey::from_secret(config.secret());
        Self {
            config,
            key,
            header: Header::new(Algorithm::HS256),
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn issue(&self, claims: &[Claim], issued_at: DateTime<Utc>) -> Result<String, IssueError> {
        self.issue_descriptor(&TokenDescriptor::new(claims.to_vec(), issued_at))
    }

    pub fn issue_descriptor(&self, descriptor: &TokenDescriptor) -> Result<String, IssueError> {
        let payload = self.payload(descriptor)?;
        let token = encode(&self.header, &payload, &self.key)?;
        debug!(
            claims = descriptor.claims.len(),
            issued_at = %descriptor.issued_at,
            "issued JWT"
        );
        Ok(token)
    }

    /// Payload keys serialize in a stable order, so equal descriptors give
    /// byte-identical tokens.
    fn payload(&self, descriptor: &TokenDescriptor) -> Result<Map<String, Value>, IssueError> {
        let expires_at = descriptor
            .expires_at(&self.config)
            .ok_or(IssueError::TimestampOutOfRange)?;

        let mut payload = Map::new();
        for claim in &descriptor.claims {
            if claim.is_registered() {
                return Err(IssueError::ReservedClaim(claim.claim_type.clone()));
            }
            append_claim(&mut payload, claim);
        }

        let issued_at = descriptor.issued_at.timestamp();
        payload.insert("iss".into(), Value::from(self.config.issuer()));
        payload.insert("aud".into(), Value::from(self.config.audience()));
        payload.insert("iat".into(), Value::from(issued_at));
        payload.insert("nbf".into(), Value::from(descriptor.not_before().timestamp()));
        payload.insert("exp".into(), Value::from(expires_at.timestamp()));
        Ok(payload)
    }
}

/// Repeated claim types collect into a JSON array.
fn append_claim(payload: &mut Map<String, Value>, claim: &Claim) {
    let value = Value::String(claim.value.clone());
    match payload.get_mut(&claim.claim_type) {
        None => {
            payload.insert(claim.claim_type.clone(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}
