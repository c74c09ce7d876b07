//! Rendering options configuration.

/// Options for rendering presentations.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit each slide's id before its content
    pub include_slide_ids: bool,

    /// Character for unordered list markers
    pub list_marker: char,

    /// Add blank line between blocks
    pub paragraph_spacing: bool,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Prefix for relative image URLs in markdown (e.g., "assets/")
    pub image_path_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_slide_ids: false,
            list_marker: '-',
            paragraph_spacing: true,
            escape_special_chars: true,
            image_path_prefix: String::new(),
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit slide ids.
    pub fn with_slide_ids(mut self, include: bool) -> Self {
        self.include_slide_ids = include;
        self
    }

    /// Set the unordered list marker.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Separate blocks with a blank line.
    pub fn with_paragraph_spacing(mut self, spacing: bool) -> Self {
        self.paragraph_spacing = spacing;
        self
    }

    /// Escape Markdown special characters in text.
    pub fn with_escape_special_chars(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the image path prefix for markdown references.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    pub(crate) fn block_separator(&self) -> &'static str {
        if self.paragraph_spacing {
            "\n\n"
        } else {
            "\n"
        }
    }
}
