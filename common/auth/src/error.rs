use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Why a bearer token was not accepted.
///
/// Variants are distinguishable for logging and metrics only; the HTTP
/// boundary collapses all of them into the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is not trusted")]
    InvalidIssuer,
    #[error("token audience does not match")]
    InvalidAudience,
    #[error("token has expired")]
    Expired,
    #[error("token is not yet valid")]
    NotYetValid,
}

impl Rejection {
    /// Stable label used for log fields and metric outcomes.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Malformed => "malformed",
            Rejection::InvalidSignature => "invalid_signature",
            Rejection::InvalidIssuer => "invalid_issuer",
            Rejection::InvalidAudience => "invalid_audience",
            Rejection::Expired => "expired",
            Rejection::NotYetValid => "not_yet_valid",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Rejection {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        match value.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => Rejection::InvalidSignature,
            _ => Rejection::Malformed,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "missing_header",
            AuthError::InvalidAuthorization => "invalid_header",
            AuthError::Rejected(rejection) => rejection.reason(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: "AUTH_UNAUTHORIZED",
            message: "unauthorized",
        };
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

/// Startup-time configuration problems. Never produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("JWT secret must not be empty")]
    EmptySecret,
    #[error("JWT issuer must not be empty")]
    EmptyIssuer,
    #[error("JWT audience must not be empty")]
    EmptyAudience,
    #[error("JWT expiry must be a positive number of minutes, got {0}")]
    InvalidExpiry(i64),
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("claim '{0}' is managed by the issuer and cannot be supplied")]
    ReservedClaim(String),
    #[error("token lifetime overflows the supported timestamp range")]
    TimestampOutOfRange,
    #[error("failed to encode token: {0}")]
    Encode(String),
}

impl From<jsonwebtoken::errors::Error> for IssueError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Encode(value.to_string())
    }
}
