use crate::error::{CaptureError, Result};
use crate::parsers::Queryable;
use ego_tree::{NodeId, NodeMut, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

/// HTML document backed by `scraper` (html5ever error recovery)
pub struct HtmlDocument {
    inner: Html,
}

impl HtmlDocument {
    /// Parse a full document
    pub fn parse(markup: &str) -> Self {
        let inner = Html::parse_document(markup);
        if !inner.errors.is_empty() {
            ::log::trace!("HTML parser recovered from {} errors", inner.errors.len());
        }
        Self { inner }
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.inner.tree.get(node).and_then(ElementRef::wrap)
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| CaptureError::ParseError(format!("invalid selector `{}`: {}", selector, e)))
}

/// Deep-copy the children of `source` under `target`
fn graft(target: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let mut copy = target.append(child.value().clone());
        graft(&mut copy, child);
    }
}

impl Queryable for HtmlDocument {
    type Node = NodeId;

    fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = compile(selector)?;
        Ok(self.inner.select(&selector).map(|el| el.id()).collect())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.value().attr(name).map(str::to_string)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(mut node) = self.inner.tree.get_mut(node) else {
            return false;
        };
        let Node::Element(element) = node.value() else {
            return false;
        };

        for (attr_name, attr_value) in element.attrs.iter_mut() {
            if &*attr_name.local == name {
                *attr_value = value.into();
                return true;
            }
        }
        false
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(mut node) = self.inner.tree.get_mut(node) {
            node.detach();
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.element(node)
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    fn html(&self, node: NodeId) -> String {
        self.element(node)
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    fn set_html(&mut self, node: NodeId, markup: &str) {
        let fragment = Html::parse_fragment(markup);
        let Some(mut target) = self.inner.tree.get_mut(node) else {
            return;
        };

        while let Some(mut child) = target.first_child() {
            child.detach();
        }
        // The fragment parser wraps its content in an <html> element
        graft(&mut target, *fragment.root_element());
    }

    fn serialize(&self) -> String {
        self.inner.html()
    }
}
