use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::FetchConfig;

pub mod client;
pub mod token;

pub use client::{MetadataClient, MetadataTree};
pub use token::{acquire_token, ImdsToken};

/// Header carrying the requested token lifetime on the token PUT.
pub const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
/// Header carrying the session token on every metadata GET.
pub const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Build the HTTP client shared by the token request and every metadata GET.
pub fn build_http_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .context("creating HTTP client")
}
