use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use api_service::config::load_jwt_config;
use chrono::{TimeZone, Utc};
use clap::Parser;
use common_auth::{Claim, TokenIssuer};

#[derive(Parser, Debug)]
#[command(
    about = "Mint a bearer token signed with the JWT_* environment configuration",
    long_about = None
)]
struct Options {
    /// Claim to embed as TYPE=VALUE (repeatable)
    #[arg(long = "claim", value_name = "TYPE=VALUE", value_parser = parse_claim)]
    claims: Vec<Claim>,

    /// Issue time in Unix seconds; defaults to now
    #[arg(long, value_name = "SECONDS")]
    issued_at: Option<i64>,
}

fn parse_claim(raw: &str) -> Result<Claim, String> {
    let (claim_type, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=VALUE, got '{raw}'"))?;
    let claim_type = claim_type.trim();
    if claim_type.is_empty() {
        return Err(format!("claim type missing in '{raw}'"));
    }
    Ok(Claim::new(claim_type, value))
}

fn main() -> Result<()> {
    let opts = Options::parse();

    let config = Arc::new(load_jwt_config().context("mint-token needs the JWT_* variables")?);
    let issued_at = match opts.issued_at {
        Some(seconds) => Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| anyhow!("--issued-at {seconds} is out of range"))?,
        None => Utc::now(),
    };

    let token = TokenIssuer::new(config).issue(&opts.claims, issued_at)?;
    println!("{token}");
    Ok(())
}
