use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Hostnames rejected outright
const BLOCKED_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Hostname prefixes for private network ranges.
///
/// This is a coarse textual check, not a CIDR test: `172.` blocks all of
/// 172.0.0.0/8 (only 172.16/12 is private) while IPv6 loopback, `0.0.0.0` and
/// names resolving to private addresses get through.
const BLOCKED_HOST_PREFIXES: [&str; 3] = ["192.168.", "10.", "172."];

/// Policy applied to user-supplied URLs before anything is fetched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPolicy {
    /// Skip the local/private host denylist (local development and tests only)
    #[serde(default)]
    pub allow_private_networks: bool,
}

impl UrlPolicy {
    /// Policy that also accepts local and private network hosts
    pub fn permissive() -> Self {
        Self {
            allow_private_networks: true,
        }
    }

    /// Validate and canonicalize a raw URL string
    ///
    /// Inputs without an http(s) scheme get `https://` prepended before
    /// parsing, so `example.com` becomes `https://example.com/`.
    pub fn normalize(&self, raw: &str) -> Result<Url> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CaptureError::InvalidUrl("URL is empty".to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&candidate)
            .map_err(|e| CaptureError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CaptureError::InvalidUrl(
                "Only HTTP and HTTPS protocols are supported".to_string(),
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| CaptureError::InvalidUrl(format!("{}: missing host", trimmed)))?
            .to_ascii_lowercase();

        if !self.allow_private_networks && is_blocked_host(&host) {
            ::log::warn!("Rejected URL with blocked host: {}", host);
            return Err(CaptureError::BlockedHost(host));
        }

        ::log::debug!("Normalized {} -> {}", raw, url);
        Ok(url)
    }
}

/// Check a lowercased hostname against the local/private denylist
pub fn is_blocked_host(host: &str) -> bool {
    BLOCKED_HOSTS.contains(&host)
        || BLOCKED_HOST_PREFIXES
            .iter()
            .any(|prefix| host.starts_with(prefix))
}

/// Normalize with the default (restrictive) policy
pub fn normalize_url(raw: &str) -> Result<Url> {
    UrlPolicy::default().normalize(raw)
}
