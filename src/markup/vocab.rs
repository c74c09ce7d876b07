//! The markup vocabulary as a closed set of tag variants.

use crate::model::{NodeKind, TextStyle};

/// Inline formatting tags that style text instead of producing nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineMark {
    Bold,
    Italic,
    Underline,
    Code,
}

impl InlineMark {
    /// Apply this mark on top of an inherited style.
    pub fn apply(self, mut style: TextStyle) -> TextStyle {
        match self {
            InlineMark::Bold => style.bold = true,
            InlineMark::Italic => style.italic = true,
            InlineMark::Underline => style.underline = true,
            InlineMark::Code => style.code = true,
        }
        style
    }
}

/// A recognized markup tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Document wrapper; carries no content of its own.
    Presentation,
    /// Slide boundary.
    Section,
    /// Inline formatting mark.
    Mark(InlineMark),
    /// Any element that becomes a content node (including unknown tags).
    Content(NodeKind),
}

impl Tag {
    /// Classify a tag name (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PRESENTATION" => Tag::Presentation,
            "SECTION" => Tag::Section,
            "B" | "STRONG" => Tag::Mark(InlineMark::Bold),
            "I" | "EM" => Tag::Mark(InlineMark::Italic),
            "U" => Tag::Mark(InlineMark::Underline),
            "CODE" => Tag::Mark(InlineMark::Code),
            _ => Tag::Content(NodeKind::from_tag(name)),
        }
    }
}

/// Canonical spelling of the slide boundary tag.
pub const SECTION: &str = "SECTION";

/// Canonical spelling of the document wrapper tag.
pub const PRESENTATION: &str = "PRESENTATION";

/// Elements that never have children: an open tag is also a close tag.
pub fn is_void(name: &str) -> bool {
    matches!(name, "IMG" | "ICON")
}
