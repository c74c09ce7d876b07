//! Content node and text leaf models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Horizontal alignment of a slide or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse an alignment keyword (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" | "centre" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            _ => None,
        }
    }
}

/// The kind of a content node, one variant per markup element that
/// produces a node, plus an opaque fallback for tags outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    H1,
    H2,
    H3,
    Paragraph,
    List,
    ListItem,
    Image,
    Icon,
    Group,
    Columns,
    Bullets,
    Icons,
    Cycle,
    Arrows,
    Timeline,
    Pyramid,
    Compare,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    Chart,
    ChartData,
    ChartLabel,
    ChartValue,
    /// Unknown tag, stored as its lowercased name.
    Other(String),
}

impl NodeKind {
    /// Map a markup tag name to a node kind (case-insensitive).
    pub fn from_tag(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "H1" => NodeKind::H1,
            "H2" => NodeKind::H2,
            "H3" => NodeKind::H3,
            "P" => NodeKind::Paragraph,
            "UL" => NodeKind::List,
            "LI" => NodeKind::ListItem,
            "IMG" => NodeKind::Image,
            "ICON" => NodeKind::Icon,
            "DIV" => NodeKind::Group,
            "COLUMNS" => NodeKind::Columns,
            "BULLETS" => NodeKind::Bullets,
            "ICONS" => NodeKind::Icons,
            "CYCLE" => NodeKind::Cycle,
            "ARROWS" => NodeKind::Arrows,
            "TIMELINE" => NodeKind::Timeline,
            "PYRAMID" => NodeKind::Pyramid,
            "COMPARE" => NodeKind::Compare,
            "TABLE" => NodeKind::Table,
            "TR" => NodeKind::TableRow,
            "TH" => NodeKind::TableHeader,
            "TD" => NodeKind::TableCell,
            "CHART" => NodeKind::Chart,
            "DATA" => NodeKind::ChartData,
            "LABEL" => NodeKind::ChartLabel,
            "VALUE" => NodeKind::ChartValue,
            _ => NodeKind::Other(name.to_ascii_lowercase()),
        }
    }

    /// The serialized `type` tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::H1 => "h1",
            NodeKind::H2 => "h2",
            NodeKind::H3 => "h3",
            NodeKind::Paragraph => "p",
            NodeKind::List => "ul",
            NodeKind::ListItem => "li",
            NodeKind::Image => "img",
            NodeKind::Icon => "icon",
            NodeKind::Group => "div",
            NodeKind::Columns => "columns",
            NodeKind::Bullets => "bullets",
            NodeKind::Icons => "icons",
            NodeKind::Cycle => "cycle",
            NodeKind::Arrows => "arrows",
            NodeKind::Timeline => "timeline",
            NodeKind::Pyramid => "pyramid",
            NodeKind::Compare => "compare",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tr",
            NodeKind::TableHeader => "th",
            NodeKind::TableCell => "td",
            NodeKind::Chart => "chart",
            NodeKind::ChartData => "data",
            NodeKind::ChartLabel => "label",
            NodeKind::ChartValue => "value",
            NodeKind::Other(name) => name,
        }
    }

    /// Heading level (1-3), or `None` for non-heading kinds.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NodeKind::H1 => Some(1),
            NodeKind::H2 => Some(2),
            NodeKind::H3 => Some(3),
            _ => None,
        }
    }

    /// Check if this is a heading kind.
    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Check if this kind is one of the structured layout containers whose
    /// children are DIV-wrapped item groups.
    pub fn is_structured_layout(&self) -> bool {
        matches!(
            self,
            NodeKind::Columns
                | NodeKind::Bullets
                | NodeKind::Icons
                | NodeKind::Cycle
                | NodeKind::Arrows
                | NodeKind::Timeline
                | NodeKind::Pyramid
                | NodeKind::Compare
        )
    }

    /// Check if children of this kind are inline text runs.
    pub fn holds_inline_text(&self) -> bool {
        matches!(
            self,
            NodeKind::H1
                | NodeKind::H2
                | NodeKind::H3
                | NodeKind::Paragraph
                | NodeKind::ListItem
                | NodeKind::TableHeader
                | NodeKind::TableCell
                | NodeKind::ChartLabel
                | NodeKind::ChartValue
        )
    }
}

impl From<String> for NodeKind {
    fn from(name: String) -> Self {
        NodeKind::from_tag(&name)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Style flags of a text leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Italic text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Underlined text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    /// Code/monospace text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
}

impl TextStyle {
    /// Check if style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.underline || self.code
    }
}

/// A run of text with uniform styling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(flatten)]
    pub style: TextStyle,
}

impl TextLeaf {
    /// Create a plain text leaf with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a styled text leaf.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Check if this leaf is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A child of a content node: a nested node or a text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentChild {
    Node(ContentNode),
    Text(TextLeaf),
}

impl ContentChild {
    /// Get the nested node, if this child is one.
    pub fn as_node(&self) -> Option<&ContentNode> {
        match self {
            ContentChild::Node(node) => Some(node),
            ContentChild::Text(_) => None,
        }
    }

    /// Get the text leaf, if this child is one.
    pub fn as_text(&self) -> Option<&TextLeaf> {
        match self {
            ContentChild::Text(leaf) => Some(leaf),
            ContentChild::Node(_) => None,
        }
    }
}

/// A node of a slide's content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Child nodes and text leaves, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentChild>,

    /// Horizontal alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Alignment>,

    /// Indentation level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<u32>,

    /// Link or media URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Media caption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Vec<TextLeaf>>,

    /// Remaining source attributes (e.g. `query`, `charttype`)
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl ContentNode {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            align: None,
            indent: None,
            url: None,
            caption: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a node holding a single plain text leaf.
    pub fn with_text(kind: NodeKind, text: impl Into<String>) -> Self {
        let mut node = Self::new(kind);
        node.children.push(ContentChild::Text(TextLeaf::plain(text)));
        node
    }

    /// Append a child node.
    pub fn push_node(&mut self, node: ContentNode) {
        self.children.push(ContentChild::Node(node));
    }

    /// Append a text leaf.
    pub fn push_text(&mut self, leaf: TextLeaf) {
        self.children.push(ContentChild::Text(leaf));
    }

    /// Look up a passthrough attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterate over the direct child nodes, skipping text leaves.
    pub fn child_nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.children.iter().filter_map(ContentChild::as_node)
    }

    /// All nodes below this one, in pre-order.
    pub fn descendants(&self) -> Vec<&ContentNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&ContentNode> = self.child_nodes().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let before = stack.len();
            stack.extend(node.child_nodes());
            stack[before..].reverse();
        }
        out
    }

    /// Concatenated text of this node and all its descendants.
    ///
    /// Text of sibling block nodes is separated by a single space, as are
    /// the text runs of nodes that do not hold inline text.
    pub fn plain_text(&self) -> String {
        let joins_runs = self.kind.holds_inline_text();
        let mut parts: Vec<String> = Vec::new();
        let mut inline = String::new();

        for child in &self.children {
            match child {
                ContentChild::Text(leaf) if joins_runs => inline.push_str(&leaf.text),
                ContentChild::Text(leaf) => {
                    if !leaf.text.is_empty() {
                        parts.push(leaf.text.clone());
                    }
                }
                ContentChild::Node(node) => {
                    if !inline.is_empty() {
                        parts.push(std::mem::take(&mut inline));
                    }
                    let text = node.plain_text();
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
        }
        if !inline.is_empty() {
            parts.push(inline);
        }

        parts.join(" ")
    }

    /// Check if this node has neither children nor attributes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty() && self.url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_mapping() {
        assert_eq!(NodeKind::from_tag("H1"), NodeKind::H1);
        assert_eq!(NodeKind::from_tag("td"), NodeKind::TableCell);
        assert_eq!(
            NodeKind::from_tag("SPARKLINE"),
            NodeKind::Other("sparkline".to_string())
        );
        assert_eq!(NodeKind::Paragraph.as_str(), "p");
        assert_eq!(NodeKind::Other("x-widget".to_string()).as_str(), "x-widget");

        assert!(NodeKind::Timeline.is_structured_layout());
        assert!(!NodeKind::Table.is_structured_layout());
        assert!(NodeKind::ChartValue.holds_inline_text());
        assert_eq!(NodeKind::H3.heading_level(), Some(3));
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("Center"), Some(Alignment::Center));
        assert_eq!(Alignment::parse(" right "), Some(Alignment::Right));
        assert_eq!(Alignment::parse("justify"), None);
    }

    #[test]
    fn test_plain_text() {
        let mut list = ContentNode::new(NodeKind::List);
        list.push_node(ContentNode::with_text(NodeKind::ListItem, "one"));
        list.push_node(ContentNode::with_text(NodeKind::ListItem, "two"));
        assert_eq!(list.plain_text(), "one two");

        let mut para = ContentNode::new(NodeKind::Paragraph);
        para.push_text(TextLeaf::plain("Hello, "));
        para.push_text(TextLeaf::styled(
            "World",
            TextStyle {
                bold: true,
                ..Default::default()
            },
        ));
        assert_eq!(para.plain_text(), "Hello, World");

        let mut group = ContentNode::new(NodeKind::Group);
        group.push_text(TextLeaf::plain("Step"));
        group.push_text(TextLeaf::plain("one"));
        group.push_node(ContentNode::with_text(NodeKind::Paragraph, "Body"));
        assert_eq!(group.plain_text(), "Step one Body");
    }

    #[test]
    fn test_descendants_preorder() {
        let mut row = ContentNode::new(NodeKind::TableRow);
        row.push_node(ContentNode::with_text(NodeKind::TableHeader, "a"));
        row.push_node(ContentNode::with_text(NodeKind::TableHeader, "b"));
        let mut table = ContentNode::new(NodeKind::Table);
        table.push_node(row);

        let kinds: Vec<&str> = table.descendants().iter().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["tr", "th", "th"]);
    }

    #[test]
    fn test_node_serialization() {
        let mut icon = ContentNode::new(NodeKind::Icon);
        icon.attributes
            .insert("query".to_string(), "rocket".to_string());
        let json = serde_json::to_string(&icon).unwrap();
        assert_eq!(json, r#"{"type":"icon","query":"rocket"}"#);

        let leaf = TextLeaf::plain("plain");
        let json = serde_json::to_string(&leaf).unwrap();
        // Unset style flags should not be serialized
        assert_eq!(json, r#"{"text":"plain"}"#);
    }

    #[test]
    fn test_node_roundtrip() {
        let mut heading = ContentNode::with_text(NodeKind::H2, "Title");
        heading.align = Some(Alignment::Center);
        let json = serde_json::to_string(&heading).unwrap();
        let parsed: ContentNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, heading);
    }
}
