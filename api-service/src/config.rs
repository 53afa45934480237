use anyhow::{anyhow, Context, Result};
use common_auth::{JwtConfig, JwtOptions};
use std::env;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Reads the `JwtOptions` section from `JWT_*` environment variables.
pub fn load_jwt_options() -> Result<JwtOptions> {
    jwt_options_from(|key| env::var(key).ok())
}

/// Loads and validates the JWT configuration. Any problem here is fatal at startup.
pub fn load_jwt_config() -> Result<JwtConfig> {
    let options = load_jwt_options()?;
    JwtConfig::try_from(options).context("Invalid JWT configuration")
}

pub fn load_bind_addr() -> Result<SocketAddr> {
    bind_addr_from(|key| env::var(key).ok())
}

pub fn jwt_options_from<F>(lookup: F) -> Result<JwtOptions>
where
    F: Fn(&str) -> Option<String>,
{
    // The secret is used byte-for-byte, so it is not trimmed.
    let secret = lookup("JWT_SECRET")
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;
    let issuer = required(&lookup, "JWT_ISSUER")?;
    let audience = required(&lookup, "JWT_AUDIENCE")?;

    let expiry_in_minutes = required(&lookup, "JWT_EXPIRY_MINUTES")?
        .parse::<i64>()
        .context("Failed to parse JWT_EXPIRY_MINUTES")?;

    let clock_skew_seconds = lookup("JWT_CLOCK_SKEW_SECONDS")
        .and_then(|value| normalize_optional(&value))
        .map(|value| value.parse::<u64>())
        .transpose()
        .context("Failed to parse JWT_CLOCK_SKEW_SECONDS")?
        .unwrap_or(0);

    Ok(JwtOptions {
        secret,
        issuer,
        audience,
        expiry_in_minutes,
        clock_skew_seconds,
    })
}

pub fn bind_addr_from<F>(lookup: F) -> Result<SocketAddr>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("HOST")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("Invalid HOST '{host}'"))?;

    let port = lookup("PORT")
        .and_then(|value| normalize_optional(&value))
        .map(|value| value.parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?
        .unwrap_or(DEFAULT_PORT);

    Ok(SocketAddr::new(ip, port))
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("{key} must be set"))
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
