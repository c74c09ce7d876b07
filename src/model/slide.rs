//! Slide, root image and layout models.

use super::{Alignment, ContentNode, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of a slide.
///
/// The first five variants form the closed presentation layout set; the
/// structured variants name a layout vocabulary element, and `Other`
/// carries any value outside both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutType {
    Left,
    Right,
    Vertical,
    Title,
    Content,
    Columns,
    Bullets,
    Icons,
    Cycle,
    Arrows,
    Timeline,
    Pyramid,
    Compare,
    Table,
    Chart,
    Other(String),
}

impl LayoutType {
    /// Parse a layout name (case-insensitive).
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "left" => LayoutType::Left,
            "right" => LayoutType::Right,
            "vertical" => LayoutType::Vertical,
            "title" => LayoutType::Title,
            "content" => LayoutType::Content,
            "columns" => LayoutType::Columns,
            "bullets" => LayoutType::Bullets,
            "icons" => LayoutType::Icons,
            "cycle" => LayoutType::Cycle,
            "arrows" => LayoutType::Arrows,
            "timeline" => LayoutType::Timeline,
            "pyramid" => LayoutType::Pyramid,
            "compare" => LayoutType::Compare,
            "table" => LayoutType::Table,
            "chart" => LayoutType::Chart,
            _ => LayoutType::Other(value),
        }
    }

    /// The layout implied by a content node kind, if it is a layout element.
    pub fn from_node_kind(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Columns => Some(LayoutType::Columns),
            NodeKind::Bullets => Some(LayoutType::Bullets),
            NodeKind::Icons => Some(LayoutType::Icons),
            NodeKind::Cycle => Some(LayoutType::Cycle),
            NodeKind::Arrows => Some(LayoutType::Arrows),
            NodeKind::Timeline => Some(LayoutType::Timeline),
            NodeKind::Pyramid => Some(LayoutType::Pyramid),
            NodeKind::Compare => Some(LayoutType::Compare),
            NodeKind::Table => Some(LayoutType::Table),
            NodeKind::Chart => Some(LayoutType::Chart),
            _ => None,
        }
    }

    /// The serialized name of this layout.
    pub fn as_str(&self) -> &str {
        match self {
            LayoutType::Left => "left",
            LayoutType::Right => "right",
            LayoutType::Vertical => "vertical",
            LayoutType::Title => "title",
            LayoutType::Content => "content",
            LayoutType::Columns => "columns",
            LayoutType::Bullets => "bullets",
            LayoutType::Icons => "icons",
            LayoutType::Cycle => "cycle",
            LayoutType::Arrows => "arrows",
            LayoutType::Timeline => "timeline",
            LayoutType::Pyramid => "pyramid",
            LayoutType::Compare => "compare",
            LayoutType::Table => "table",
            LayoutType::Chart => "chart",
            LayoutType::Other(value) => value,
        }
    }

    /// Check if this layout is in the closed presentation set
    /// {left, right, vertical, title, content}.
    pub fn is_canonical(&self) -> bool {
        matches!(
            self,
            LayoutType::Left
                | LayoutType::Right
                | LayoutType::Vertical
                | LayoutType::Title
                | LayoutType::Content
        )
    }
}

impl From<String> for LayoutType {
    fn from(value: String) -> Self {
        LayoutType::parse(&value)
    }
}

impl From<LayoutType> for String {
    fn from(layout: LayoutType) -> Self {
        layout.as_str().to_string()
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation status of a slide's root image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    #[default]
    Pending,
    Generating,
    Success,
    Error,
}

/// The full-bleed image directive of a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootImage {
    /// Image search/generation query (never empty)
    pub query: String,

    /// Resolved image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Generation status
    #[serde(default)]
    pub status: ImageStatus,
}

impl RootImage {
    /// Create a pending image for a query.
    pub fn pending(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            url: None,
            status: ImageStatus::Pending,
        }
    }

    /// Create an image whose URL is already known.
    pub fn resolved(query: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            url: Some(url.into()),
            status: ImageStatus::Success,
        }
    }
}

/// A single slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Sequential identifier (`slide-1`, `slide-2`, ...)
    pub id: String,

    /// Content nodes, in document order
    #[serde(default)]
    pub content: Vec<ContentNode>,

    /// Slide layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,

    /// Root image directive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_image: Option<RootImage>,

    /// Slide alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl Slide {
    /// Create an empty slide with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Identifier for the slide at a 0-based position.
    pub fn id_for_index(index: usize) -> String {
        format!("slide-{}", index + 1)
    }

    /// Text of the first heading, if any.
    pub fn title(&self) -> Option<String> {
        self.content
            .iter()
            .flat_map(|node| std::iter::once(node).chain(node.descendants()))
            .find(|node| node.kind.is_heading())
            .map(|node| node.plain_text())
            .filter(|text| !text.is_empty())
    }

    /// Extract all text content, one line per top-level node.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|node| node.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the slide has no content and no root image.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.root_image.is_none()
    }

    /// Get the number of top-level content nodes.
    pub fn len(&self) -> usize {
        self.content.len()
    }
}
