use serde::{Deserialize, Serialize};

/// Metadata pulled from `<meta>` tags; each field comes from the first match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
}

/// Represents a captured page: sanitized markup plus its content inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteContent {
    /// URL that was actually fetched (the caller's input when capture failed)
    pub url: String,

    /// Page title, `<title>` first, then the first `<h1>`
    pub title: String,

    /// Sanitized body markup
    pub html: String,

    /// Captured stylesheet text
    pub css: String,

    /// Visible body text with whitespace collapsed
    pub text: String,

    pub metadata: PageMetadata,

    /// Absolute image URLs in document order
    pub images: Vec<String>,

    /// Absolute link URLs (fragment, mailto and tel targets excluded)
    pub links: Vec<String>,

    /// Absolute script URLs (the script elements themselves are stripped)
    pub scripts: Vec<String>,

    /// Absolute stylesheet URLs from `<link rel="stylesheet">`
    #[serde(default)]
    pub stylesheets: Vec<String>,

    /// Set when any stage failed; everything but `url` is empty then
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebsiteContent {
    /// Create the failure record for a URL
    pub fn failed(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            url: url.into(),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Whether this record carries an error instead of content
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Markup handed to the enhancement service: the body followed by the
    /// captured CSS in a single `<style>` block
    pub fn enhancement_input(&self) -> String {
        if self.css.is_empty() {
            self.html.clone()
        } else {
            format!("{}\n<style>{}</style>", self.html, self.css)
        }
    }

    /// Render the record as a complete, self-contained HTML document
    pub fn to_standalone_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
{html}
</body>
</html>
"#,
            title = escape_text(&self.title),
            css = self.css,
            html = self.html,
        )
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
