use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::token::ImdsToken;
use super::TOKEN_HEADER;
use crate::config::FetchConfig;

/// Metadata keyed by name, in the order the service listed them.
/// Leaves are `Value::String`, directories are `Value::Object`.
pub type MetadataTree = Map<String, Value>;

/// Token-authenticated reader for the instance metadata service.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    config: FetchConfig,
    token: ImdsToken,
    http_client: Client,
}

impl MetadataClient {
    /// Wrap an HTTP client built by [`build_http_client`](super::build_http_client).
    pub fn new(config: FetchConfig, token: ImdsToken, http_client: Client) -> Self {
        Self {
            config,
            token,
            http_client,
        }
    }

    /// GET a path relative to the base URL and return the body text unchanged.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.config.metadata_url(path);
        trace!(url = %url, "GET metadata");

        let response = self
            .http_client
            .get(&url)
            .header(TOKEN_HEADER, self.token.as_str())
            .send()
            .await
            .with_context(|| format!("sending request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("GET {} returned status {}", url, response.status()));
        }

        response
            .text()
            .await
            .with_context(|| format!("reading response body from {}", url))
    }

    /// Fetch one key and return it as a single-entry tree.
    pub async fn fetch_key(&self, key: &str) -> Result<MetadataTree> {
        let body = self
            .get_text(key)
            .await
            .with_context(|| format!("Failed to retrieve key '{}'", key))?;

        debug!(key = %key, bytes = body.len(), "fetched metadata key");

        let mut tree = MetadataTree::new();
        tree.insert(key.to_string(), Value::String(body));
        Ok(tree)
    }

    /// Walk the whole metadata tree starting at the root listing.
    ///
    /// A failure anywhere in the walk discards everything fetched so far.
    pub async fn fetch_tree(&self) -> Result<MetadataTree> {
        self.fetch_tree_at("", 0)
            .await
            .context("Failed to fetch metadata")
    }

    /// Walk the directory at `path`, which is empty or ends in `/`.
    pub async fn fetch_tree_at(&self, path: &str, depth: usize) -> Result<MetadataTree> {
        if let Some(max) = self.config.max_depth {
            if depth > max {
                bail!(
                    "directory '{}' is nested {} levels deep, exceeding the limit of {}",
                    path,
                    depth,
                    max
                );
            }
        }

        let listing = self.get_text(path).await?;
        let mut tree = MetadataTree::new();

        for entry in listing_entries(&listing) {
            let child_path = format!("{}{}", path, entry);
            if entry.ends_with('/') {
                let subtree = Box::pin(self.fetch_tree_at(&child_path, depth + 1)).await?;
                tree.insert(
                    entry.trim_end_matches('/').to_string(),
                    Value::Object(subtree),
                );
            } else {
                let value = self.get_text(&child_path).await?;
                tree.insert(entry.to_string(), Value::String(value));
            }
        }

        debug!(path = %path, depth, entries = tree.len(), "fetched metadata directory");
        Ok(tree)
    }
}

/// Non-empty lines of a directory listing, with only the line terminator removed.
fn listing_entries(listing: &str) -> impl Iterator<Item = &str> {
    listing.lines().filter(|line| !line.is_empty())
}
