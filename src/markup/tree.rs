//! Element tree builder.
//!
//! Folds tokenizer events into elements. Only SECTION subtrees are kept:
//! each SECTION is handed out as a completed element once it closes, and
//! anything outside a section is dropped after its close tag.

use std::collections::BTreeMap;

use tracing::debug;

use super::tokenizer::{Event, OpenTag};
use super::vocab::{PRESENTATION, SECTION};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A markup element with its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name, upper-cased
    pub name: String,
    /// Attributes keyed by lower-cased name
    pub attributes: BTreeMap<String, String>,
    /// Children in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Look up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn from_open(tag: OpenTag) -> Self {
        Self {
            name: tag.name,
            attributes: tag.attributes,
            children: Vec::new(),
        }
    }
}

/// Stack-based builder of SECTION elements.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    stack: Vec<Element>,
    /// Index of the open SECTION in `stack`
    section: Option<usize>,
    completed: Vec<Element>,
    presentation: Option<BTreeMap<String, String>>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Open(tag) => self.open(tag),
            Event::Close(name) => self.close(&name),
            Event::Text(text) => {
                if self.section.is_some() {
                    if let Some(top) = self.stack.last_mut() {
                        top.children.push(Node::Text(text));
                    }
                }
            }
        }
    }

    fn open(&mut self, tag: OpenTag) {
        if tag.name == SECTION {
            if let Some(index) = self.section {
                debug!("implicitly closing unterminated SECTION");
                while self.stack.len() > index {
                    self.close_top();
                }
            }
            self.section = Some(self.stack.len());
        } else if tag.name == PRESENTATION && self.section.is_none() && self.presentation.is_none()
        {
            self.presentation = Some(tag.attributes.clone());
        }

        self.stack.push(Element::from_open(tag));
    }

    fn close(&mut self, name: &str) {
        let Some(index) = self.stack.iter().rposition(|el| el.name == name) else {
            debug!(tag = %name, "ignoring close tag without matching open tag");
            return;
        };

        let implicit = self.stack.len() - index - 1;
        if implicit > 0 {
            debug!(tag = %name, implicit, "closing elements left open");
        }
        while self.stack.len() > index {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let Some(element) = self.stack.pop() else {
            return;
        };

        if self.section == Some(self.stack.len()) {
            self.section = None;
            self.completed.push(element);
        } else if self.section.is_some() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(Node::Element(element));
            }
        }
    }

    /// Force-close every open element, innermost first.
    pub fn finish(&mut self) {
        if !self.stack.is_empty() {
            debug!(open = self.stack.len(), "force-closing open elements");
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
    }

    /// Check whether no SECTION is currently open.
    pub fn at_boundary(&self) -> bool {
        self.section.is_none()
    }

    /// Take the SECTION elements completed since the last call.
    pub fn take_completed(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.completed)
    }

    /// The currently open SECTION as it would look if force-closed now.
    pub fn open_section(&self) -> Option<Element> {
        let index = self.section?;
        let mut open: Vec<Element> = self.stack[index..].to_vec();
        while open.len() > 1 {
            if let Some(child) = open.pop() {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(Node::Element(child));
                }
            }
        }
        open.pop()
    }

    /// Attributes of the first PRESENTATION element seen outside a section.
    pub fn presentation_attributes(&self) -> Option<&BTreeMap<String, String>> {
        self.presentation.as_ref()
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
