use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::comments::listing::DEFAULT_PAGE_SIZE;

#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    /// Base URL of the Revalio REST backend, without trailing slash.
    pub api_base_url: String,
    /// Verifies viewer tokens. Without it every viewer is anonymous for
    /// ownership purposes, though tokens are still forwarded upstream.
    pub jwt_secret: Option<String>,
    pub comment_page_size: usize,
    pub upstream_timeout: Duration,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let port: u16 = parse_or("PORT", 3000);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let api_base_url = env::var("REVALIO_API_URL").context("REVALIO_API_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        Ok(Self {
            port,
            addr,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            jwt_secret,
            comment_page_size: parse_or("COMMENT_PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            upstream_timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 10)),
        })
    }

    /// Settings pointing at `api_base_url` with every other value defaulted.
    pub fn for_api(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        Self {
            port: 3000,
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            jwt_secret: None,
            comment_page_size: DEFAULT_PAGE_SIZE,
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}
