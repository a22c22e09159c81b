use crate::config::FetchOptions;
use crate::error::{CaptureError, Result};
use crate::filter::{UrlPolicy, is_blocked_host};
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderName, HeaderValue,
    LOCATION, USER_AGENT,
};
use reqwest::{Client, redirect};
use url::Url;

/// A fetched response body with the URL it was finally served from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after any redirects were followed
    pub url: Url,
    pub status: u16,
    /// `Location` of an unfollowed redirect
    pub location: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Browser-like request headers
fn browser_headers(options: &FetchOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let user_agent = HeaderValue::from_str(&options.user_agent)
        .map_err(|e| CaptureError::Config(format!("invalid user agent: {}", e)))?;
    headers.insert(USER_AGENT, user_agent);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    Ok(headers)
}

/// Redirect handling: none, or up to `max_redirects` hops that never land
/// on a host the URL policy would have rejected
fn redirect_policy(options: &FetchOptions, policy: &UrlPolicy) -> redirect::Policy {
    if !options.follow_redirects {
        return redirect::Policy::none();
    }

    let max_redirects = options.max_redirects;
    let allow_private = policy.allow_private_networks;
    redirect::Policy::custom(move |attempt| {
        let blocked = !allow_private
            && attempt
                .url()
                .host_str()
                .is_some_and(|host| is_blocked_host(&host.to_ascii_lowercase()));

        // `previous()` starts with the original request, so its length is this hop's number
        if attempt.previous().len() > max_redirects {
            attempt.error(format!("more than {} redirects", max_redirects))
        } else if blocked {
            attempt.error("redirect to a local or private network host")
        } else {
            attempt.follow()
        }
    })
}

/// Build the per-call client
fn build_client(options: &FetchOptions, policy: &UrlPolicy) -> Result<Client> {
    Client::builder()
        .default_headers(browser_headers(options)?)
        .redirect(redirect_policy(options, policy))
        .build()
        .map_err(|e| CaptureError::TransportError(format!("client build failed: {}", e)))
}

/// Issue one GET for `url`, bounded by `options.timeout_ms`.
///
/// The timeout covers the whole exchange including the body. When it fires
/// the in-flight future is dropped, which tears down the connection. With
/// redirects disabled a 3xx response is returned as-is; any other non-2xx
/// status is an `HttpError`. `url` is expected to be normalized already;
/// `policy` is only consulted for redirect targets.
pub async fn fetch_page(url: &Url, options: &FetchOptions, policy: &UrlPolicy) -> Result<FetchedPage> {
    let client = build_client(options, policy)?;
    let timeout = options.timeout();

    ::log::debug!("GET {} (timeout {}ms)", url, options.timeout_ms);

    let exchange = async {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().clone();

        if status.is_redirection() && !options.follow_redirects {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            ::log::info!(
                "Not following {} redirect from {} to {:?}",
                status.as_u16(),
                final_url,
                location
            );
            return Ok(FetchedPage {
                url: final_url,
                status: status.as_u16(),
                location,
                body: String::new(),
            });
        }

        if !status.is_success() {
            return Err(CaptureError::HttpError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            location: None,
            body,
        })
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => {
            if let Ok(page) = &result {
                ::log::debug!(
                    "Fetched {} ({}, {} bytes)",
                    page.url,
                    page.status,
                    page.body.len()
                );
            }
            result
        }
        Err(_) => {
            ::log::warn!("Request to {} timed out after {}ms", url, options.timeout_ms);
            Err(CaptureError::Timeout(timeout))
        }
    }
}

fn transport_error(e: reqwest::Error) -> CaptureError {
    if e.is_redirect() {
        CaptureError::TransportError(format!("redirect rejected: {}", e))
    } else {
        CaptureError::TransportError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers(&FetchOptions::default()).unwrap();
        for name in [
            "user-agent",
            "accept",
            "accept-language",
            "accept-encoding",
            "connection",
            "upgrade-insecure-requests",
        ] {
            assert!(headers.contains_key(name), "missing header {}", name);
        }
    }

    #[test]
    fn test_rejects_unusable_user_agent() {
        let options = FetchOptions {
            user_agent: "bad\nagent".to_string(),
            ..FetchOptions::default()
        };
        assert!(matches!(
            browser_headers(&options),
            Err(CaptureError::Config(_))
        ));
    }

    #[test]
    fn test_status_helpers() {
        let page = FetchedPage {
            url: Url::parse("https://example.com/").unwrap(),
            status: 301,
            location: Some("/next".to_string()),
            body: String::new(),
        };
        assert!(page.is_redirect());
        assert!(!page.is_success());
    }
}
