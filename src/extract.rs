use crate::error::Result;
use crate::parsers::Queryable;
use crate::results::PageMetadata;
use crate::utils::{collapse_whitespace, is_excluded_link, resolve_url};
use url::Url;

/// Title used when neither `<title>` nor `<h1>` has text
pub const UNTITLED: &str = "Untitled";

/// Everything the extractor reads out of a page before sanitization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub title: String,
    pub metadata: PageMetadata,
    /// Inline `<style>` contents, newline-joined
    pub css: String,
    pub stylesheets: Vec<String>,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub scripts: Vec<String>,
    pub text: String,
}

/// Walk a parsed page and capture its content model.
///
/// Order matters: styles and the URL inventories are read before
/// `script`, `style` and `noscript` are removed to capture the body text.
/// The document is left with those elements removed.
pub fn extract<D: Queryable>(doc: &mut D, base: &Url) -> Result<Extraction> {
    let title = extract_title(doc)?;
    let metadata = extract_metadata(doc)?;

    let css = doc
        .select("style")?
        .into_iter()
        .map(|node| doc.text(node))
        .collect::<Vec<_>>()
        .join("\n");

    let stylesheets = resolved_attrs(doc, r#"link[rel="stylesheet"]"#, "href", base)?;
    let images = resolved_attrs(doc, "img[src]", "src", base)?;
    let scripts = resolved_attrs(doc, "script[src]", "src", base)?;

    let links = doc
        .select("a[href]")?
        .into_iter()
        .filter_map(|node| doc.attr(node, "href"))
        .filter(|href| !href.trim().is_empty() && !is_excluded_link(href))
        .map(|href| resolve_url(&href, base))
        .collect::<Vec<_>>();

    doc.remove_all("script, style, noscript")?;
    let text = match doc.select_first("body")? {
        Some(body) => collapse_whitespace(&doc.text(body)),
        None => String::new(),
    };

    ::log::debug!(
        "Extracted '{}': {} images, {} links, {} scripts, {} stylesheets",
        title,
        images.len(),
        links.len(),
        scripts.len(),
        stylesheets.len()
    );

    Ok(Extraction {
        title,
        metadata,
        css,
        stylesheets,
        images,
        links,
        scripts,
        text,
    })
}

fn extract_title<D: Queryable>(doc: &D) -> Result<String> {
    for selector in ["title", "h1"] {
        if let Some(node) = doc.select_first(selector)? {
            let text = doc.text(node).trim().to_string();
            if !text.is_empty() {
                return Ok(text);
            }
        }
    }
    Ok(UNTITLED.to_string())
}

fn extract_metadata<D: Queryable>(doc: &D) -> Result<PageMetadata> {
    let description = first_attr(doc, r#"meta[name="description"]"#, "content")?
        .filter(|s| !s.is_empty());
    let description = match description {
        Some(d) => Some(d),
        None => first_attr(doc, r#"meta[property="og:description"]"#, "content")?,
    };

    let charset = first_attr(doc, "meta[charset]", "charset")?.filter(|s| !s.is_empty());
    let charset = match charset {
        Some(c) => Some(c),
        None => first_attr(doc, r#"meta[http-equiv="Content-Type"]"#, "content")?,
    };

    Ok(PageMetadata {
        description,
        keywords: first_attr(doc, r#"meta[name="keywords"]"#, "content")?,
        author: first_attr(doc, r#"meta[name="author"]"#, "content")?,
        viewport: first_attr(doc, r#"meta[name="viewport"]"#, "content")?,
        charset,
    })
}

/// Attribute of the first element matching `selector`
fn first_attr<D: Queryable>(doc: &D, selector: &str, attr: &str) -> Result<Option<String>> {
    Ok(doc
        .select_first(selector)?
        .and_then(|node| doc.attr(node, attr)))
}

/// Resolved, non-empty attribute values of every match, in document order
fn resolved_attrs<D: Queryable>(
    doc: &D,
    selector: &str,
    attr: &str,
    base: &Url,
) -> Result<Vec<String>> {
    Ok(doc
        .select(selector)?
        .into_iter()
        .filter_map(|node| doc.attr(node, attr))
        .filter(|value| !value.trim().is_empty())
        .map(|value| resolve_url(&value, base))
        .collect())
}
