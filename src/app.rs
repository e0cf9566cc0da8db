use anyhow::{Context, Result};
use tracing::info;

use crate::config::FetchConfig;
use crate::imds::{acquire_token, build_http_client, MetadataClient};
use crate::output;

/// Acquire a token, fetch one key (or the whole tree) and render it as JSON.
///
/// Returns the rendered document only once every request has succeeded.
/// An empty key is treated as no key and walks the full tree.
pub async fn run(config: FetchConfig, key: Option<&str>) -> Result<String> {
    config.validate().context("invalid configuration")?;

    let http_client = build_http_client(&config)?;
    let token = acquire_token(&http_client, &config).await?;
    let client = MetadataClient::new(config, token, http_client);

    let key = key.filter(|key| !key.is_empty());

    let tree = match key {
        Some(key) => client.fetch_key(key).await?,
        None => client.fetch_tree().await?,
    };
    info!(entries = tree.len(), "metadata fetched");

    output::render(&tree)
}
