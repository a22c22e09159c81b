//! Capture a remote web page as a sanitized, structured content record.
//!
//! The pipeline for one URL is strictly sequential:
//! normalize ([`filter`]) → fetch ([`fetcher`]) → parse ([`parsers`]) →
//! extract ([`extract`]) → sanitize ([`sanitize`]). [`SiteCapture`] wires the
//! stages together and adds retry ([`retry`]) and batch modes.

// Re-export modules
pub mod config;
pub mod enhance;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod retry;
pub mod sanitize;
pub mod stylesheets;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CaptureConfig, FetchOptions, StylesheetConfig};
pub use error::{CaptureError, Result};
pub use filter::UrlPolicy;
pub use results::{PageMetadata, WebsiteContent};
pub use retry::RetryPolicy;

use std::time::Duration;

/// Main entry point: captures pages with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct SiteCapture {
    options: FetchOptions,
    policy: UrlPolicy,
    stylesheets: StylesheetConfig,
    retry_base_delay: Option<Duration>,
}

impl SiteCapture {
    /// Create a capture with default options and the restrictive URL policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch options used for every page
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the URL policy (host denylist)
    pub fn with_policy(mut self, policy: UrlPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configure external stylesheet fetching
    pub fn with_stylesheets(mut self, stylesheets: StylesheetConfig) -> Self {
        self.stylesheets = stylesheets;
        self
    }

    /// Override the first backoff delay used by `fetch_with_retry`
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Apply a loaded configuration
    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.options = config.fetch;
        self.policy = config.policy;
        self.stylesheets = config.stylesheets;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = CaptureConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = CaptureConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Run the whole pipeline once, surfacing failures as errors
    pub async fn capture(&self, url: &str) -> Result<WebsiteContent> {
        let target = self.policy.normalize(url)?;
        let page = fetcher::fetch_page(&target, &self.options, &self.policy).await?;

        if !page.is_success() {
            // Only an unfollowed redirect gets here
            return Err(CaptureError::HttpError {
                status: page.status,
                status_text: match &page.location {
                    Some(location) => format!("Redirect to {}", location),
                    None => "Redirect".to_string(),
                },
            });
        }

        let base = page.url;
        let mut doc = parsers::parse(&page.body);
        let extraction = extract::extract(&mut doc, &base)?;
        let html = sanitize::sanitize(&mut doc, &base)?;

        let css = if self.stylesheets.enabled && !extraction.stylesheets.is_empty() {
            let external = stylesheets::fetch_stylesheets(
                &extraction.stylesheets,
                &self.stylesheets,
                &self.policy,
                &self.options,
            )
            .await;
            stylesheets::merge_css(&extraction.css, &external)
        } else {
            extraction.css
        };

        ::log::info!("Captured {} ({} bytes of markup)", base, html.len());

        Ok(WebsiteContent {
            url: base.to_string(),
            title: extraction.title,
            html,
            css,
            text: extraction.text,
            metadata: extraction.metadata,
            images: extraction.images,
            links: extraction.links,
            scripts: extraction.scripts,
            stylesheets: extraction.stylesheets,
            error: None,
        })
    }

    /// Capture one page. Never fails: errors come back in the record's `error`.
    pub async fn fetch_website_content(&self, url: &str) -> WebsiteContent {
        match self.capture(url).await {
            Ok(content) => content,
            Err(e) => {
                ::log::warn!("Failed to capture {}: {}", url, e);
                WebsiteContent::failed(url, e)
            }
        }
    }

    /// Capture many pages concurrently. Results follow the input order and
    /// one page failing does not affect the others.
    pub async fn fetch_multiple_urls<S: AsRef<str>>(&self, urls: &[S]) -> Vec<WebsiteContent> {
        ::log::info!("Capturing {} pages", urls.len());
        futures::future::join_all(
            urls.iter()
                .map(|url| self.fetch_website_content(url.as_ref())),
        )
        .await
    }

    /// Batch mode with retries: every URL runs concurrently with its own
    /// backoff schedule. Exhausted URLs come back as failure records.
    pub async fn fetch_multiple_with_retry<S: AsRef<str>>(
        &self,
        urls: &[S],
        max_retries: u32,
    ) -> Vec<WebsiteContent> {
        ::log::info!("Capturing {} pages with up to {} attempts", urls.len(), max_retries);
        futures::future::join_all(urls.iter().map(|url| async move {
            let url = url.as_ref();
            match self.fetch_with_retry(url, max_retries).await {
                Ok(content) => content,
                Err(e) => WebsiteContent::failed(url, e),
            }
        }))
        .await
    }

    /// Capture with up to `max_retries` attempts and exponential backoff,
    /// returning the last error once every attempt has failed
    pub async fn fetch_with_retry(&self, url: &str, max_retries: u32) -> Result<WebsiteContent> {
        let mut policy = RetryPolicy::new(max_retries);
        if let Some(delay) = self.retry_base_delay {
            policy = policy.with_base_delay(delay);
        }

        retry::retry_with_backoff(&policy, move |attempt| {
            ::log::debug!("Capture attempt {} for {}", attempt, url);
            self.capture(url)
        })
        .await
    }
}

/// Capture one page with the default policy
pub async fn fetch_website_content(url: &str, options: Option<FetchOptions>) -> WebsiteContent {
    capture_with(options).fetch_website_content(url).await
}

/// Capture several pages concurrently with the default policy
pub async fn fetch_multiple_urls<S: AsRef<str>>(
    urls: &[S],
    options: Option<FetchOptions>,
) -> Vec<WebsiteContent> {
    capture_with(options).fetch_multiple_urls(urls).await
}

/// Capture one page with retries and the default policy
pub async fn fetch_with_retry(
    url: &str,
    max_retries: u32,
    options: Option<FetchOptions>,
) -> Result<WebsiteContent> {
    capture_with(options).fetch_with_retry(url, max_retries).await
}

fn capture_with(options: Option<FetchOptions>) -> SiteCapture {
    SiteCapture::new().with_options(options.unwrap_or_default())
}
