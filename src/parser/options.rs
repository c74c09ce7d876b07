//! Parser options configuration.

use crate::model::{ContentNode, LayoutType};

/// How the text passed to `ingest` relates to the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Every call carries the full markup received so far
    Cumulative,
    /// Every call carries only the newly generated text
    Delta,
    /// Cumulative when the text extends the buffer, delta otherwise
    #[default]
    Auto,
}

/// How a slide's layout type is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Use the `layout` attribute as written, falling back to the first
    /// structured layout element of the slide
    #[default]
    Literal,
    /// Like `Literal`, but map anything outside
    /// {left, right, vertical, title, content} to `content`
    Canonical,
}

impl LayoutPolicy {
    /// Resolve the layout of a slide from its SECTION `layout` attribute and
    /// its materialized content.
    pub fn resolve(self, attribute: Option<&str>, content: &[ContentNode]) -> Option<LayoutType> {
        let literal = attribute
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(LayoutType::parse)
            .or_else(|| {
                content
                    .iter()
                    .find_map(|node| LayoutType::from_node_kind(&node.kind))
            });

        match self {
            LayoutPolicy::Literal => literal,
            LayoutPolicy::Canonical => literal.map(|layout| {
                if layout.is_canonical() {
                    layout
                } else {
                    LayoutType::Content
                }
            }),
        }
    }
}

/// How much of the buffer is re-tokenized on each ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RescanStrategy {
    /// Resume after the last closed slide when the buffer still starts with
    /// the text already scanned
    #[default]
    Checkpoint,
    /// Always rescan the whole buffer
    Full,
}

/// Options for the streaming parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Buffer update contract
    pub ingest_mode: IngestMode,

    /// Layout type derivation
    pub layout_policy: LayoutPolicy,

    /// Rescan behavior
    pub rescan: RescanStrategy,
}

impl ParserOptions {
    /// Create default parser options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ingest mode.
    pub fn with_ingest_mode(mut self, mode: IngestMode) -> Self {
        self.ingest_mode = mode;
        self
    }

    /// Set the layout policy.
    pub fn with_layout_policy(mut self, policy: LayoutPolicy) -> Self {
        self.layout_policy = policy;
        self
    }

    /// Set the rescan strategy.
    pub fn with_rescan(mut self, rescan: RescanStrategy) -> Self {
        self.rescan = rescan;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_default_options() {
        let opts = ParserOptions::default();
        assert_eq!(opts.ingest_mode, IngestMode::Auto);
        assert_eq!(opts.layout_policy, LayoutPolicy::Literal);
        assert_eq!(opts.rescan, RescanStrategy::Checkpoint);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = ParserOptions::new()
            .with_ingest_mode(IngestMode::Delta)
            .with_layout_policy(LayoutPolicy::Canonical)
            .with_rescan(RescanStrategy::Full);

        assert_eq!(opts.ingest_mode, IngestMode::Delta);
        assert_eq!(opts.layout_policy, LayoutPolicy::Canonical);
        assert_eq!(opts.rescan, RescanStrategy::Full);
    }

    #[test]
    fn test_literal_policy() {
        let content = vec![
            ContentNode::with_text(NodeKind::H1, "Plan"),
            ContentNode::new(NodeKind::Timeline),
        ];
        let policy = LayoutPolicy::Literal;
        assert_eq!(policy.resolve(Some("left"), &content), Some(LayoutType::Left));
        assert_eq!(policy.resolve(None, &content), Some(LayoutType::Timeline));
        assert_eq!(policy.resolve(Some("  "), &content), Some(LayoutType::Timeline));
        assert_eq!(policy.resolve(None, &content[..1]), None);
        assert_eq!(
            policy.resolve(Some("default"), &[]),
            Some(LayoutType::Other("default".to_string()))
        );
    }

    #[test]
    fn test_canonical_policy() {
        let content = vec![ContentNode::new(NodeKind::Chart)];
        let policy = LayoutPolicy::Canonical;
        assert_eq!(policy.resolve(Some("Vertical"), &[]), Some(LayoutType::Vertical));
        assert_eq!(policy.resolve(None, &content), Some(LayoutType::Content));
        assert_eq!(policy.resolve(Some("default"), &[]), Some(LayoutType::Content));
        assert_eq!(policy.resolve(None, &[]), None);
    }
}
