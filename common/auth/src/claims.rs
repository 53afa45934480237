use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Rejection;

/// Claim names set by the issuer from configuration and the issuance time.
pub const REGISTERED_CLAIMS: [&str; 5] = ["iss", "aud", "iat", "nbf", "exp"];

pub fn is_registered_claim(name: &str) -> bool {
    REGISTERED_CLAIMS.contains(&name)
}

/// A single typed assertion carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn is_registered(&self) -> bool {
        is_registered_claim(&self.claim_type)
    }
}

/// Authenticated identity extracted from a verified token.
///
/// `claims` holds every claim in the payload, registered ones included.
/// A claim type that appeared as a JSON array contributes one entry per
/// element.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub claims: Vec<Claim>,
    pub issuer: String,
    pub audience: Vec<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// First value recorded for `claim_type`.
    pub fn find(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|claim| claim.claim_type == claim_type)
            .map(|claim| claim.value.as_str())
    }

    pub fn values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |claim| claim.claim_type == claim_type)
            .map(|claim| claim.value.as_str())
    }

    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.values(claim_type).any(|candidate| candidate == value)
    }

    /// Claims supplied at issuance, without the registered ones.
    pub fn custom_claims(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(|claim| !claim.is_registered())
    }
}

/// Flattens a verified payload into claims.
pub(crate) fn claims_from_payload(payload: &Map<String, Value>) -> Vec<Claim> {
    let mut claims = Vec::with_capacity(payload.len());
    for (name, value) in payload {
        match value {
            Value::Array(items) => {
                claims.extend(items.iter().map(|item| Claim::new(name, scalar_text(item))))
            }
            other => claims.push(Claim::new(name, scalar_text(other))),
        }
    }
    claims
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Reads the `aud` claim, which may be a single string or an array.
pub(crate) fn audiences(payload: &Map<String, Value>) -> Vec<String> {
    match payload.get("aud") {
        Some(Value::String(single)) => vec![single.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

/// Reads a NumericDate claim. Absent is `None`; anything but an integer is malformed.
pub(crate) fn numeric_date(
    payload: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<i64>, Rejection> {
    let Some(value) = payload.get(name) else {
        return Ok(None);
    };
    let Value::Number(number) = value else {
        return Err(Rejection::Malformed);
    };

    number.as_i64().map(Some).ok_or(Rejection::Malformed)
}

pub(crate) fn to_datetime(seconds: i64) -> Result<DateTime<Utc>, Rejection> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(Rejection::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn arrays_expand_into_repeated_claims() {
        let map = payload(json!({ "role": ["admin", "cashier"], "sub": "alice" }));
        let mut claims = claims_from_payload(&map);
        claims.sort();
        assert_eq!(
            claims,
            vec![
                Claim::new("role", "admin"),
                Claim::new("role", "cashier"),
                Claim::new("sub", "alice"),
            ]
        );
    }

    #[test]
    fn non_string_scalars_keep_their_json_text() {
        let map = payload(json!({ "exp": 1700000000, "admin": true }));
        let claims = claims_from_payload(&map);
        assert!(claims.contains(&Claim::new("exp", "1700000000")));
        assert!(claims.contains(&Claim::new("admin", "true")));
    }

    #[test]
    fn audience_accepts_string_or_array() {
        assert_eq!(audiences(&payload(json!({ "aud": "api" }))), vec!["api"]);
        assert_eq!(
            audiences(&payload(json!({ "aud": ["web", "api"] }))),
            vec!["web", "api"]
        );
        assert!(audiences(&payload(json!({}))).is_empty());
    }

    #[test]
    fn numeric_date_requires_an_integer() {
        let map = payload(json!({ "exp": "tomorrow", "nbf": 10.7, "iat": 10 }));
        assert_eq!(numeric_date(&map, "exp"), Err(Rejection::Malformed));
        assert_eq!(numeric_date(&map, "nbf"), Err(Rejection::Malformed));
        assert_eq!(numeric_date(&map, "iat"), Ok(Some(10)));
        assert_eq!(numeric_date(&map, "jti"), Ok(None));
    }

    #[test]
    fn identity_helpers_filter_by_type() {
        let identity = Identity {
            claims: vec![
                Claim::new("iss", "issuer"),
                Claim::new("role", "admin"),
                Claim::new("role", "manager"),
            ],
            issuer: "issuer".to_string(),
            audience: vec!["aud".to_string()],
            issued_at: None,
            not_before: None,
            expires_at: to_datetime(0).expect("epoch"),
        };

        assert_eq!(identity.find("role"), Some("admin"));
        assert!(identity.has_claim("role", "manager"));
        assert!(!identity.has_claim("role", "cashier"));
        assert_eq!(identity.custom_claims().count(), 2);
    }
}
