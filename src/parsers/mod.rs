//! Lenient HTML parsing into a mutable, queryable tree.
//!
//! Extraction and sanitization are written against [`Queryable`] so the
//! backing parser can be swapped; [`HtmlDocument`] is the `scraper` backed
//! implementation used by the pipeline.

pub mod html;


use crate::error::Result;

pub use html::HtmlDocument;

/// A parsed document that can be queried with CSS selectors and mutated in place
pub trait Queryable {
    /// Handle to an element in the tree
    type Node: Copy;

    /// All elements matching `selector`, in document order
    fn select(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// First element matching `selector`
    fn select_first(&self, selector: &str) -> Result<Option<Self::Node>> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// Attribute value, if present
    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Replace the value of an existing attribute.
    ///
    /// Returns `false` when the element has no such attribute.
    fn set_attr(&mut self, node: Self::Node, name: &str, value: &str) -> bool;

    /// Detach the element and its whole subtree
    fn remove(&mut self, node: Self::Node);

    /// Concatenated text of all descendant text nodes
    fn text(&self, node: Self::Node) -> String;

    /// Inner markup of the element
    fn html(&self, node: Self::Node) -> String;

    /// Replace the element's children with the parsed `markup` fragment
    fn set_html(&mut self, node: Self::Node, markup: &str);

    /// Serialize the whole document back to markup
    fn serialize(&self) -> String;

    /// Remove every element matching `selector`, returning how many went
    fn remove_all(&mut self, selector: &str) -> Result<usize> {
        let nodes = self.select(selector)?;
        let count = nodes.len();
        for node in nodes {
            self.remove(node);
        }
        Ok(count)
    }
}

/// Parse raw HTML. Never fails: malformed markup yields a best-effort tree.
pub fn parse(markup: &str) -> HtmlDocument {
    HtmlDocument::parse(markup)
}
