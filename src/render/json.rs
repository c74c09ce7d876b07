//! JSON renderer implementation.

use crate::error::Result;
use crate::model::{Presentation, Slide};

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a Presentation to JSON.
pub fn to_json(deck: &Presentation, format: JsonFormat) -> Result<String> {
    Ok(match format {
        JsonFormat::Compact => serde_json::to_string(deck)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(deck)?,
    })
}

/// Convert a Presentation to JSON with default formatting.
pub fn to_json_default(deck: &Presentation) -> Result<String> {
    to_json(deck, JsonFormat::Pretty)
}

/// Convert a slide list to a JSON array.
pub fn slides_to_json(slides: &[Slide], format: JsonFormat) -> Result<String> {
    Ok(match format {
        JsonFormat::Compact => serde_json::to_string(slides)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(slides)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, LayoutType, NodeKind, RootImage};

    fn sample() -> Presentation {
        let mut slide = Slide::new("slide-1");
        slide.layout_type = Some(LayoutType::Left);
        slide.root_image = Some(RootImage::pending("mountain sunrise"));
        slide
            .content
            .push(ContentNode::with_text(NodeKind::H1, "Hello"));
        Presentation::from_slides(vec![slide])
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Hello\""));
        assert!(json.contains("\"type\": \"h1\""));
        assert!(json.contains("\"layoutType\": \"left\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#""rootImage":{"query":"mountain sunrise","status":"pending"}"#));
    }

    #[test]
    fn test_to_json_default() {
        let json = to_json_default(&Presentation::new()).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_slides_to_json() {
        let deck = sample();
        let json = slides_to_json(&deck.slides, JsonFormat::Compact).unwrap();
        assert!(json.starts_with('['));

        let parsed: Vec<Slide> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, deck.slides);
    }
}
