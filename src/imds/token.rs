use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::fmt;
use tracing::debug;

use super::TOKEN_TTL_HEADER;
use crate::config::FetchConfig;

/// Session token returned by the IMDSv2 token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ImdsToken(String);

impl ImdsToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImdsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImdsToken").field(&"<redacted>").finish()
    }
}

/// Request a session token with a PUT to the configured token URL.
///
/// Any transport error, timeout or non-2xx status is returned as an error;
/// callers treat it as fatal.
pub async fn acquire_token(http: &Client, config: &FetchConfig) -> Result<ImdsToken> {
    request_token(http, config)
        .await
        .context("Failed to retrieve IMDSv2 token")
}

async fn request_token(http: &Client, config: &FetchConfig) -> Result<ImdsToken> {
    debug!(
        url = %config.token_url,
        ttl_secs = config.token_ttl_secs,
        "requesting IMDSv2 token"
    );

    let response = http
        .put(&config.token_url)
        .header(TOKEN_TTL_HEADER, config.token_ttl_secs.to_string())
        .timeout(config.timeout)
        .send()
        .await
        .context("sending token request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "token endpoint returned status {}: {}",
            status,
            body.trim()
        ));
    }

    let token = response.text().await.context("reading token body")?;
    debug!(token_len = token.len(), "received IMDSv2 token");
    Ok(ImdsToken(token))
}
