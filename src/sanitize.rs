use crate::error::Result;
use crate::parsers::Queryable;
use crate::utils::{is_absolute_reference, is_excluded_link, resolve_url};
use url::Url;

/// Executable and embedded content, removed first
const EMBEDDED_CONTENT: &str = "script, noscript, iframe, embed, object";

/// Style nodes, removed once their text has been captured
const STYLE_CONTENT: &str = r#"link[rel="stylesheet"], style"#;

/// Strip unsafe and already-captured nodes, absolutize references, and
/// return the sanitized `<body>` inner markup.
///
/// Must run after extraction: it is the only destructive pass over the tree.
pub fn sanitize<D: Queryable>(doc: &mut D, base: &Url) -> Result<String> {
    let embedded = doc.remove_all(EMBEDDED_CONTENT)?;
    let styles = doc.remove_all(STYLE_CONTENT)?;
    ::log::debug!(
        "Removed {} embedded and {} style elements",
        embedded,
        styles
    );

    let rewritten = absolutize_references(doc, base)?;
    ::log::debug!("Rewrote {} relative references against {}", rewritten, base);

    Ok(match doc.select_first("body")? {
        Some(body) => doc.html(body),
        None => doc.serialize(),
    })
}

/// Rewrite relative `img[src]` and `a[href]` values to absolute URLs.
///
/// Already-absolute values (any scheme, `data:` included) are left alone,
/// so running this twice changes nothing the second time. Returns the
/// number of attributes rewritten.
pub fn absolutize_references<D: Queryable>(doc: &mut D, base: &Url) -> Result<usize> {
    let mut rewritten = 0;

    for node in doc.select("img[src]")? {
        let Some(src) = doc.attr(node, "src") else {
            continue;
        };
        if src.trim().is_empty() || is_absolute_reference(&src) {
            continue;
        }
        let resolved = resolve_url(&src, base);
        if resolved != src && doc.set_attr(node, "src", &resolved) {
            rewritten += 1;
        }
    }

    for node in doc.select("a[href]")? {
        let Some(href) = doc.attr(node, "href") else {
            continue;
        };
        if href.trim().is_empty() || is_excluded_link(&href) || is_absolute_reference(&href) {
            continue;
        }
        let resolved = resolve_url(&href, base);
        if resolved != href && doc.set_attr(node, "href", &resolved) {
            rewritten += 1;
        }
    }

    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers;

    fn base() -> Url {
        Url::parse("https://example.com/c/d").unwrap()
    }

    #[test]
    fn test_strips_executable_and_embedded_content() {
        let mut doc = parsers::parse(
            r#"<body><p>keep</p>
            <script src="/app.js"></script><script>alert(1)</script>
            <noscript>js off</noscript>
            <iframe src="https://ads.example.net"></iframe>
            <embed src="movie.swf"><object data="x.swf"></object></body>"#,
        );
        let html = sanitize(&mut doc, &base()).unwrap();

        for tag in ["<script", "<noscript", "<iframe", "<embed", "<object"] {
            assert!(!html.contains(tag), "{} should be stripped: {}", tag, html);
        }
        assert!(html.contains("<p>keep</p>"));
    }

    #[test]
    fn test_strips_style_nodes() {
        let mut doc = parsers::parse(
            r#"<head><link rel="stylesheet" href="a.css"><style>p{}</style></head>
            <body><style>div{}</style><link rel="stylesheet" href="b.css"><p>x</p></body>"#,
        );
        let html = sanitize(&mut doc, &base()).unwrap();
        assert!(!html.contains("<style"));
        assert!(!html.contains("<link"));
        assert!(doc.select("style, link").unwrap().is_empty());
    }

    #[test]
    fn test_absolutizes_references() {
        let mut doc = parsers::parse(
            r##"<body>
            <img src="/a.png"><img src="img.png">
            <img src="data:image/gif;base64,R0lGOD">
            <img src="https://cdn.example.org/x.png">
            <a href="/page">p</a><a href="#top">t</a>
            <a href="mailto:x@y.com">m</a><a href="https://other.org/">o</a>
            </body>"##,
        );
        sanitize(&mut doc, &base()).unwrap();

        let srcs: Vec<String> = doc
            .select("img")
            .unwrap()
            .into_iter()
            .filter_map(|n| doc.attr(n, "src"))
            .collect();
        assert_eq!(
            srcs,
            vec![
                "https://example.com/a.png",
                "https://example.com/c/img.png",
                "data:image/gif;base64,R0lGOD",
                "https://cdn.example.org/x.png",
            ]
        );

        let hrefs: Vec<String> = doc
            .select("a")
            .unwrap()
            .into_iter()
            .filter_map(|n| doc.attr(n, "href"))
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "https://example.com/page",
                "#top",
                "mailto:x@y.com",
                "https://other.org/",
            ]
        );
    }

    #[test]
    fn test_absolutize_is_idempotent() {
        let mut doc = parsers::parse(
            r#"<img src="../up.png"><a href="sub/page.html">x</a><img src="//cdn.example.org/y.png">"#,
        );
        let first = absolutize_references(&mut doc, &base()).unwrap();
        assert_eq!(first, 3);
        let after_once = doc.serialize();

        let second = absolutize_references(&mut doc, &base()).unwrap();
        assert_eq!(second, 0);
        assert_eq!(doc.serialize(), after_once);
    }

    #[test]
    fn test_returns_body_inner_markup() {
        let mut doc = parsers::parse(
            r#"<html><head><title>T</title></head><body><h1>Hi</h1><img src="/a.png"></body></html>"#,
        );
        let html = sanitize(&mut doc, &Url::parse("https://example.com").unwrap()).unwrap();
        assert_eq!(html, r#"<h1>Hi</h1><img src="https://example.com/a.png">"#);
    }
}
