use anyhow::{bail, Result};
use std::time::Duration;

/// Per-request timeout applied to every IMDS call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;
/// Token lifetime requested from the token endpoint. IMDS caps this at six hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 21600;
const MAX_TOKEN_TTL_SECS: u64 = 21600;

/// Settings for a single fetch run, passed explicitly through the call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_url: String,
    pub token_url: String,
    pub timeout: Duration,
    pub token_ttl_secs: u64,
    /// Directory nesting limit for tree walks; `None` walks without bound.
    pub max_depth: Option<usize>,
}

impl FetchConfig {
    pub fn new(base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_url: token_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            max_depth: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_ttl(mut self, ttl_secs: u64) -> Self {
        self.token_ttl_secs = ttl_secs;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_url("base URL", &self.base_url)?;
        check_url("token URL", &self.token_url)?;
        if self.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!(
                "token TTL must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECS,
                self.token_ttl_secs
            );
        }
        Ok(())
    }

    /// Joins the base URL and a relative metadata path with a single `/`.
    ///
    /// An empty path addresses the root listing (`<base>/`).
    pub fn metadata_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn check_url(label: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        bail!("{} must not be empty", label);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("{} must start with http:// or https://, got '{}'", label, url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FetchConfig {
        FetchConfig::new(
            "http://169.254.169.254/latest/meta-data/",
            "http://169.254.169.254/latest/api/token",
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = config();
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.token_ttl_secs, 21600);
        assert_eq!(cfg.max_depth, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_metadata_url_joins_with_single_slash() {
        let cfg = config();
        assert_eq!(
            cfg.metadata_url("hostname"),
            "http://169.254.169.254/latest/meta-data/hostname"
        );
        assert_eq!(
            cfg.metadata_url("/public-keys/0/"),
            "http://169.254.169.254/latest/meta-data/public-keys/0/"
        );
        assert_eq!(cfg.metadata_url(""), "http://169.254.169.254/latest/meta-data/");

        let bare = FetchConfig::new("http://h/latest/meta-data", "http://h/latest/api/token");
        assert_eq!(bare.metadata_url("ami-id"), "http://h/latest/meta-data/ami-id");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let cfg = FetchConfig::new("", "http://h/token");
        assert!(cfg.validate().is_err());

        let cfg = FetchConfig::new("http://h/meta", "ftp://h/token");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("token URL"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_ttl() {
        assert!(config().with_timeout(Duration::ZERO).validate().is_err());
        assert!(config().with_token_ttl(0).validate().is_err());
        assert!(config().with_token_ttl(21601).validate().is_err());
        assert!(config().with_token_ttl(60).validate().is_ok());
    }
}
