use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime configuration shared by token validation and issuance.
///
/// Built once at startup and shared read-only (usually behind an `Arc`).
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    expiry_minutes: i64,
    clock_skew: Duration,
}

impl JwtConfig {
    /// Construct config with zero clock skew.
    ///
    /// The secret is used verbatim as the HMAC-SHA256 key. An empty secret,
    /// issuer or audience, or a non-positive expiry, is a misconfiguration.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if audience.trim().is_empty() {
            return Err(ConfigError::EmptyAudience);
        }
        if expiry_minutes <= 0 || chrono::Duration::try_minutes(expiry_minutes).is_none() {
            return Err(ConfigError::InvalidExpiry(expiry_minutes));
        }

        Ok(Self {
            secret,
            issuer,
            audience,
            expiry_minutes,
            clock_skew: Duration::ZERO,
        })
    }

    /// Adjust the tolerance applied to `exp` and `nbf`.
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn expiry_minutes(&self) -> i64 {
        self.expiry_minutes
    }

    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.expiry_minutes)
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub(crate) fn clock_skew_seconds(&self) -> i64 {
        i64::try_from(self.clock_skew.as_secs()).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

/// The `JwtOptions` configuration section as supplied by the host process.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JwtOptions {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_in_minutes: i64,
    #[serde(default)]
    pub clock_skew_seconds: u64,
}

impl fmt::Debug for JwtOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtOptions")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_in_minutes", &self.expiry_in_minutes)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .finish()
    }
}

impl TryFrom<JwtOptions> for JwtConfig {
    type Error = ConfigError;

    fn try_from(options: JwtOptions) -> Result<Self, Self::Error> {
        let config = JwtConfig::new(
            options.secret.into_bytes(),
            options.issuer,
            options.audience,
            options.expiry_in_minutes,
        )?;
        Ok(config.with_clock_skew(Duration::from_secs(options.clock_skew_seconds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> JwtOptions {
        JwtOptions {
            secret: "top-secret".to_string(),
            issuer: "issuer".to_string(),
            audience: "audience".to_string(),
            expiry_in_minutes: 5,
            clock_skew_seconds: 0,
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = JwtConfig::new(Vec::new(), "issuer", "audience", 5).expect_err("must fail");
        assert_eq!(err, ConfigError::EmptySecret);
    }

    #[test]
    fn blank_issuer_and_audience_are_rejected() {
        let err = JwtConfig::new("secret", "  ", "audience", 5).expect_err("issuer");
        assert_eq!(err, ConfigError::EmptyIssuer);
        let err = JwtConfig::new("secret", "issuer", "", 5).expect_err("audience");
        assert_eq!(err, ConfigError::EmptyAudience);
    }

    #[test]
    fn non_positive_expiry_is_rejected() {
        let err = JwtConfig::new("secret", "issuer", "audience", 0).expect_err("zero");
        assert_eq!(err, ConfigError::InvalidExpiry(0));
    }

    #[test]
    fn options_section_deserializes_pascal_case() {
        let raw = r#"{
            "Secret": "s3cr3t",
            "Issuer": "TestIssuer",
            "Audience": "TestAudience",
            "ExpiryInMinutes": 5
        }"#;
        let parsed: JwtOptions = serde_json::from_str(raw).expect("parse options");
        assert_eq!(parsed.issuer, "TestIssuer");
        assert_eq!(parsed.clock_skew_seconds, 0);

        let config = JwtConfig::try_from(parsed).expect("valid config");
        assert_eq!(config.secret(), b"s3cr3t");
        assert_eq!(config.expiry(), chrono::Duration::minutes(5));
        assert_eq!(config.clock_skew(), Duration::ZERO);
    }

    #[test]
    fn clock_skew_is_carried_over() {
        let mut opts = options();
        opts.clock_skew_seconds = 30;
        let config = JwtConfig::try_from(opts).expect("valid config");
        assert_eq!(config.clock_skew_seconds(), 30);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = JwtConfig::try_from(options()).expect("valid config");
        let rendered = format!("{config:?} {:?}", options());
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
