//! Format-independent drawing tree shared by the builder and the serializer.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    /// Raw text content; escaping happens at serialization time.
    Text(String),
}

impl MarkupNode {
    pub fn text(content: impl Into<String>) -> Self {
        MarkupNode::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        }
    }

    /// Every element in the tree in document order, root included.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let MarkupNode::Element(element) = node {
                out.push(element);
                stack.extend(element.children.iter().rev());
            }
        }
        out
    }
}

impl From<Element> for MarkupNode {
    fn from(element: Element) -> Self {
        MarkupNode::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    /// Ordered attribute mapping; keys are unique.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, keeping the position of an existing key.
    pub fn attr(mut self, key: &str, value: impl Display) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(mut self, node: impl Into<MarkupNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<MarkupNode>) {
        self.children.push(node.into());
    }

    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(MarkupNode::Text(content.into()))
    }

    /// Concatenated text of the direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                MarkupNode::Text(text) => Some(text.as_str()),
                MarkupNode::Element(_) => None,
            })
            .collect()
    }
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
