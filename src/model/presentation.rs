//! Presentation (whole document) model.

use super::Slide;
use serde::{Deserialize, Serialize};

/// A parsed slide deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Presentation title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Slides in document order
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a new empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a presentation from slides, deriving the title from the
    /// first heading of the first slide.
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        let title = slides.first().and_then(Slide::title);
        Self { title, slides }
    }

    /// Get the number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if the presentation has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Get the total number of content nodes across all slides.
    pub fn total_nodes(&self) -> usize {
        self.slides
            .iter()
            .flat_map(|s| s.content.iter())
            .map(|node| 1 + node.descendants().len())
            .sum()
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        self.slides
            .iter()
            .map(Slide::plain_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to JSON string (compact).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, NodeKind};

    fn slide_with(id: &str, kind: NodeKind, text: &str) -> Slide {
        let mut slide = Slide::new(id);
        slide.content.push(ContentNode::with_text(kind, text));
        slide
    }

    #[test]
    fn test_from_slides_title() {
        let deck = Presentation::from_slides(vec![
            slide_with("slide-1", NodeKind::H1, "Welcome"),
            slide_with("slide-2", NodeKind::Paragraph, "Body"),
        ]);
        assert_eq!(deck.title.as_deref(), Some("Welcome"));
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.plain_text(), "Welcome\n\nBody");
    }

    #[test]
    fn test_empty_presentation() {
        let deck = Presentation::from_slides(Vec::new());
        assert!(deck.is_empty());
        assert!(deck.title.is_none());
        assert_eq!(deck.total_nodes(), 0);

        let json = deck.to_json_compact().unwrap();
        assert_eq!(json, r#"{"slides":[]}"#);
    }
}
