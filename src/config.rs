use crate::enhance::EnhancerConfig;
use crate::error::Result;
use crate::filter::UrlPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Browser-like User-Agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Options for a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    /// Hard limit for the whole request, body included
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// When false, a redirect response is handed back instead of followed
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// Settings for fetching `<link rel="stylesheet">` targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesheetConfig {
    /// Fetch external stylesheets and append them to the captured CSS
    #[serde(default)]
    pub enabled: bool,

    /// Only the first `max_count` stylesheets are fetched
    #[serde(default = "default_stylesheet_count")]
    pub max_count: usize,

    /// Per-stylesheet timeout
    #[serde(default = "default_stylesheet_timeout_ms")]
    pub timeout_ms: u64,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConfig {
    #[serde(default)]
    pub fetch: FetchOptions,

    #[serde(default)]
    pub policy: UrlPolicy,

    #[serde(default)]
    pub stylesheets: StylesheetConfig,

    /// Attempts used by `fetch_with_retry`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Enhancement service, only needed for `--enhance`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancer: Option<EnhancerConfig>,
}

impl CaptureConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        Ok(config)
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_count: default_stylesheet_count(),
            timeout_ms: default_stylesheet_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> usize {
    5
}

fn default_stylesheet_count() -> usize {
    5
}

fn default_stylesheet_timeout_ms() -> u64 {
    5_000
}

/// Default attempt count for retried captures
pub fn default_max_retries() -> u32 {
    3
}
