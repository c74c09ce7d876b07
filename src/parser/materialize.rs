//! Conversion of SECTION elements into slides.

use tracing::debug;

use crate::markup::{Element, Node, Tag};
use crate::model::{
    Alignment, ContentChild, ContentNode, NodeKind, RootImage, Slide, TextLeaf, TextStyle,
};

use super::ParserOptions;

/// Attribute names that would collide with the serialized node shape.
const RESERVED_ATTRIBUTES: &[&str] = &["type", "children"];

/// Build the slide for a SECTION element.
pub fn materialize(section: &Element, id: String, options: &ParserOptions) -> Slide {
    let mut slide = Slide::new(id);
    let mut sink = Sink::wrapping(NodeKind::Paragraph);

    for child in &section.children {
        match child {
            Node::Element(el) if el.name == "IMG" => {
                if slide.root_image.is_none() {
                    slide.root_image = root_image(el);
                }
            }
            _ => walk(child, TextStyle::default(), &mut sink),
        }
    }

    slide.content = sink
        .finish()
        .into_iter()
        .filter_map(|child| match child {
            ContentChild::Node(node) => Some(node),
            ContentChild::Text(_) => None,
        })
        .collect();

    slide.layout_type = options
        .layout_policy
        .resolve(section.attribute("layout"), &slide.content);
    slide.alignment = section
        .attribute("align")
        .or_else(|| section.attribute("alignment"))
        .and_then(Alignment::parse);

    slide
}

/// Root image directive of a direct-child IMG, if its `query` is usable.
fn root_image(img: &Element) -> Option<RootImage> {
    let query = img.attribute("query").map(str::trim).unwrap_or_default();
    if query.is_empty() {
        debug!("ignoring IMG without query");
        return None;
    }

    match img.attribute("url").map(str::trim) {
        Some(url) if !url.is_empty() => Some(RootImage::resolved(query, url)),
        _ => Some(RootImage::pending(query)),
    }
}

/// Convert a non-SECTION element into a content node.
fn convert_element(el: &Element) -> ContentNode {
    let kind = NodeKind::from_tag(&el.name);
    let mut sink = if kind.holds_inline_text() {
        Sink::default()
    } else {
        Sink::per_run()
    };
    let mut node = ContentNode::new(kind);
    apply_attributes(&mut node, el);

    for child in &el.children {
        walk(child, TextStyle::default(), &mut sink);
    }
    node.children = sink.finish();
    node
}

fn apply_attributes(node: &mut ContentNode, el: &Element) {
    for (key, value) in &el.attributes {
        match key.as_str() {
            "align" | "alignment" => match Alignment::parse(value) {
                Some(align) => node.align = Some(align),
                None => debug!(tag = %el.name, value = %value, "ignoring unknown alignment"),
            },
            "indent" => match value.trim().parse::<u32>() {
                Ok(indent) => node.indent = Some(indent),
                Err(_) => debug!(tag = %el.name, value = %value, "ignoring non-numeric indent"),
            },
            "url" | "href" | "src" => {
                if node.url.is_none() && !value.trim().is_empty() {
                    node.url = Some(value.trim().to_string());
                }
            }
            "caption" => {
                let caption = value.trim();
                if !caption.is_empty() {
                    node.caption = Some(vec![TextLeaf::plain(caption)]);
                }
            }
            reserved if RESERVED_ATTRIBUTES.contains(&reserved) => {
                debug!(tag = %el.name, attribute = %reserved, "dropping reserved attribute");
            }
            _ => {
                node.attributes.insert(key.clone(), value.clone());
            }
        }
    }
}

fn walk(node: &Node, style: TextStyle, sink: &mut Sink) {
    match node {
        Node::Text(text) => sink.push_leaf(TextLeaf::styled(text.clone(), style)),
        Node::Element(el) => match Tag::from_name(&el.name) {
            Tag::Mark(mark) => {
                let style = mark.apply(style);
                for child in &el.children {
                    walk(child, style, sink);
                }
            }
            // A nested wrapper contributes only its children
            Tag::Presentation | Tag::Section => {
                for child in &el.children {
                    walk(child, style, sink);
                }
            }
            Tag::Content(_) => sink.push_node(convert_element(el)),
        },
    }
}

/// Collects the children of a node, grouping consecutive text leaves into
/// segments that are trimmed at their ends.
#[derive(Default)]
struct Sink {
    children: Vec<ContentChild>,
    segment: Vec<TextLeaf>,
    /// Wrap each text segment in a node of this kind
    wrap: Option<NodeKind>,
    /// Every text run is its own segment (block content)
    per_run: bool,
}

impl Sink {
    fn wrapping(kind: NodeKind) -> Self {
        Self {
            wrap: Some(kind),
            ..Default::default()
        }
    }

    fn per_run() -> Self {
        Self {
            per_run: true,
            ..Default::default()
        }
    }

    fn push_leaf(&mut self, leaf: TextLeaf) {
        self.segment.push(leaf);
        if self.per_run {
            self.flush();
        }
    }

    fn push_node(&mut self, node: ContentNode) {
        self.flush();
        self.children.push(ContentChild::Node(node));
    }

    fn flush(&mut self) {
        let leaves = normalize_segment(std::mem::take(&mut self.segment));
        if leaves.is_empty() {
            return;
        }

        match &self.wrap {
            Some(kind) => {
                let mut node = ContentNode::new(kind.clone());
                node.children = leaves.into_iter().map(ContentChild::Text).collect();
                self.children.push(ContentChild::Node(node));
            }
            None => self
                .children
                .extend(leaves.into_iter().map(ContentChild::Text)),
        }
    }

    fn finish(mut self) -> Vec<ContentChild> {
        self.flush();
        self.children
    }
}

/// Trim the outer whitespace of a run of leaves, drop empty leaves and merge
/// neighbours with identical styling.
fn normalize_segment(mut leaves: Vec<TextLeaf>) -> Vec<TextLeaf> {
    for leaf in leaves.iter_mut() {
        let trimmed = leaf.text.trim_start();
        if trimmed.len() != leaf.text.len() {
            leaf.text = trimmed.to_string();
        }
        if !leaf.text.is_empty() {
            break;
        }
    }
    for leaf in leaves.iter_mut().rev() {
        let trimmed_len = leaf.text.trim_end().len();
        leaf.text.truncate(trimmed_len);
        if !leaf.text.is_empty() {
            break;
        }
    }

    let mut merged: Vec<TextLeaf> = Vec::with_capacity(leaves.len());
    for leaf in leaves.into_iter().filter(|leaf| !leaf.is_empty()) {
        match merged.last_mut() {
            Some(last) if last.style == leaf.style => last.text.push_str(&leaf.text),
            _ => merged.push(leaf),
        }
    }
    merged
}
