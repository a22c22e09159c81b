use crate::config::{FetchOptions, StylesheetConfig};
use crate::error::Result;
use crate::fetcher::fetch_page;
use crate::filter::UrlPolicy;
use futures::stream::{self, StreamExt};

/// Stylesheets fetched at the same time
const MAX_IN_FLIGHT: usize = 3;

/// Fetch external stylesheets, best-effort.
///
/// Only the first `config.max_count` URLs are tried. Each one goes through
/// the same URL policy as the page and gets its own timeout. A failed fetch
/// is logged and yields an empty string; it never fails the caller. Output
/// order follows `urls`.
pub async fn fetch_stylesheets(
    urls: &[String],
    config: &StylesheetConfig,
    policy: &UrlPolicy,
    options: &FetchOptions,
) -> Vec<String> {
    let options = FetchOptions {
        timeout_ms: config.timeout_ms,
        ..options.clone()
    };

    stream::iter(urls.iter().take(config.max_count))
        .map(|url| {
            let options = &options;
            async move {
                match fetch_one(url, policy, options).await {
                    Ok(css) => css,
                    Err(e) => {
                        ::log::warn!("Failed to fetch stylesheet {}: {}", url, e);
                        String::new()
                    }
                }
            }
        })
        .buffered(MAX_IN_FLIGHT)
        .collect()
        .await
}

async fn fetch_one(url: &str, policy: &UrlPolicy, options: &FetchOptions) -> Result<String> {
    let url = policy.normalize(url)?;
    let page = fetch_page(&url, options, policy).await?;
    if !page.is_success() {
        ::log::debug!("Stylesheet {} answered {}, skipping", url, page.status);
        return Ok(String::new());
    }
    Ok(page.body)
}

/// Append fetched stylesheet text after the inline CSS, skipping empty entries
pub fn merge_css(inline: &str, external: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(external.len() + 1);
    if !inline.is_empty() {
        parts.push(inline);
    }
    parts.extend(
        external
            .iter()
            .map(String::as_str)
            .filter(|css| !css.trim().is_empty()),
    );
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_css() {
        let external = vec!["a{}".to_string(), String::new(), "b{}".to_string()];
        assert_eq!(merge_css("body{}", &external), "body{}\na{}\nb{}");
        assert_eq!(merge_css("", &external), "a{}\nb{}");
        assert_eq!(merge_css("body{}", &[]), "body{}");
    }

    #[tokio::test]
    async fn test_blocked_stylesheets_are_swallowed() {
        let urls = vec![
            "http://localhost/a.css".to_string(),
            "http://10.0.0.1/b.css".to_string(),
        ];
        let css = fetch_stylesheets(
            &urls,
            &StylesheetConfig::default(),
            &UrlPolicy::default(),
            &FetchOptions::default(),
        )
        .await;
        assert_eq!(css, vec![String::new(), String::new()]);
    }

    #[tokio::test]
    async fn test_respects_max_count() {
        let urls: Vec<String> = (0..4).map(|i| format!("http://localhost/{}.css", i)).collect();
        let config = StylesheetConfig {
            enabled: true,
            max_count: 2,
            ..StylesheetConfig::default()
        };
        let css = fetch_stylesheets(&urls, &config, &UrlPolicy::default(), &FetchOptions::default())
            .await;
        assert_eq!(css.len(), 2);
    }
}
