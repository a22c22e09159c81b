use url::Url;

/// Resolve a possibly-relative reference against the page URL.
///
/// This is the only resolution routine in the crate; extraction and
/// rewriting both go through it. Values that cannot be resolved are passed
/// through unchanged rather than dropped.
pub fn resolve_url(reference: &str, base: &Url) -> String {
    match base.join(reference.trim()) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            ::log::debug!("Leaving unresolvable reference '{}' as-is: {}", reference, e);
            reference.to_string()
        }
    }
}

/// Whether a reference already carries its own scheme (`https:`, `data:`,
/// `mailto:` ...) and so must not be resolved against a base
pub fn is_absolute_reference(reference: &str) -> bool {
    Url::parse(reference.trim()).is_ok()
}

/// Anchor targets that never make it into the link inventory
pub fn is_excluded_link(href: &str) -> bool {
    let href = href.trim();
    href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("tel:")
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert a string to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.trim_end_matches('/').to_string();
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', '\\', '*', '"', '<', '>', '|'], "_");

    // Limit filename length
    if name.len() > 100 {
        let mut end = 100;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name[..end].to_string()
    } else {
        name
    }
}
