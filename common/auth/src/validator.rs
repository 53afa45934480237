use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{crypto, decode_header, Algorithm, DecodingKey};
use serde_json::{Map, Value};
use tracing::debug;

use crate::claims::{audiences, claims_from_payload, numeric_date, to_datetime, Identity};
use crate::config::JwtConfig;
use crate::error::Rejection;

/// Verifies HS256 bearer tokens against a fixed [`JwtConfig`].
///
/// Checks run in a fixed order and stop at the first failure: structure,
/// signature, issuer, audience, lifetime. Nothing in the payload is
/// inspected before the signature has been verified.
#[derive(Clone)]
pub struct TokenValidator {
    config: Arc<JwtConfig>,
    key: DecodingKey,
}

impl TokenValidator {
    pub fn new(config: Arc<JwtConfig>) -> Self {
        let key = DecodingKey::from_secret(config.secret());
        Self { config, key }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Validates against the current wall clock.
    pub fn validate(&self, token: &str) -> Result<Identity, Rejection> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, Rejection> {
        let result = self.check(token, now);
        match &result {
            Ok(identity) => debug!(
                issuer = %identity.issuer,
                claims = identity.claims.len(),
                "verified JWT successfully"
            ),
            Err(rejection) => debug!(reason = rejection.reason(), "rejected JWT"),
        }
        result
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, Rejection> {
        let parts = parse_compact(token)?;

        // A zero-length key or a non-HS256 header never verifies.
        if self.config.secret().is_empty() || parts.algorithm != Algorithm::HS256 {
            return Err(Rejection::InvalidSignature);
        }
        // MAC only; jsonwebtoken never sees the claims.
        let message = parts.message.as_bytes();
        if !crypto::verify(parts.signature, message, &self.key, Algorithm::HS256)? {
            return Err(Rejection::InvalidSignature);
        }
        let payload = parts.payload;

        let issuer = match payload.get("iss") {
            Some(Value::String(iss)) if iss == self.config.issuer() => iss.clone(),
            _ => return Err(Rejection::InvalidIssuer),
        };

        let audience = audiences(&payload);
        if !audience.iter().any(|aud| aud == self.config.audience()) {
            return Err(Rejection::InvalidAudience);
        }

        let expires = numeric_date(&payload, "exp")?.ok_or(Rejection::Malformed)?;
        let not_before = numeric_date(&payload, "nbf")?;
        let issued_at = numeric_date(&payload, "iat")?;

        let skew = self.config.clock_skew_seconds();
        let now = now.timestamp();
        if now > expires.saturating_add(skew) {
            return Err(Rejection::Expired);
        }
        if let Some(nbf) = not_before {
            if now < nbf.saturating_sub(skew) {
                return Err(Rejection::NotYetValid);
            }
        }

        Ok(Identity {
            claims: claims_from_payload(&payload),
            issuer,
            audience,
            issued_at: issued_at.map(to_datetime).transpose()?,
            not_before: not_before.map(to_datetime).transpose()?,
            expires_at: to_datetime(expires)?,
        })
    }
}

struct CompactParts<'a> {
    algorithm: Algorithm,
    /// `header.payload`, the bytes covered by the signature.
    message: &'a str,
    signature: &'a str,
    payload: Map<String, Value>,
}

/// Splits a compact token and decodes its header and payload.
fn parse_compact(token: &str) -> Result<CompactParts<'_>, Rejection> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Rejection::Malformed);
    };
    let Some((message, signature)) = token.rsplit_once('.') else {
        return Err(Rejection::Malformed);
    };

    let header = decode_header(token).map_err(|_| Rejection::Malformed)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| Rejection::Malformed)?;
    let payload = serde_json::from_slice::<Map<String, Value>>(&bytes)
        .map_err(|_| Rejection::Malformed)?;

    Ok(CompactParts {
        algorithm: header.alg,
        message,
        signature,
        payload,
    })
}
