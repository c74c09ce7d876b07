//! # slidemark
//!
//! Streaming parser for LLM-generated slide markup.
//!
//! A language model describes a presentation as pseudo-XML (`SECTION`
//! elements holding headings, paragraphs, images and structured layouts
//! such as `TIMELINE` or `COMPARE`). This library turns that text into
//! typed slides while it is still being generated, tolerating truncated
//! tags and malformed attributes.
//!
//! ## Quick Start
//!
//! ```
//! use slidemark::SlideParser;
//!
//! let mut parser = SlideParser::new();
//!
//! // Feed the cumulative text as it streams in
//! parser.ingest("<PRESENTATION><SECTION layout=\"left\"><H1>Intro</H1>");
//! assert!(parser.all_slides().is_empty());
//!
//! parser.ingest("<PRESENTATION><SECTION layout=\"left\"><H1>Intro</H1></SECTION>");
//! assert_eq!(parser.all_slides().len(), 1);
//!
//! // Force-close whatever is still open once the stream ends
//! parser.finalize();
//! ```
//!
//! ## One-shot Helpers
//!
//! ```no_run
//! let deck = slidemark::parse_file("deck.xml")?;
//! println!("Slides: {}", deck.slides.len());
//!
//! let markdown = slidemark::to_markdown("deck.xml")?;
//! std::fs::write("deck.md", markdown)?;
//! # Ok::<(), slidemark::Error>(())
//! ```
//!
//! ## Features
//!
//! - `ffi`: C-ABI bindings for foreign language integration

pub mod chart;
pub mod error;
pub mod markup;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-exports
pub use chart::{ChartData, ChartPoint};
pub use error::{Error, Result};
pub use model::{
    Alignment, ContentChild, ContentNode, ImageStatus, LayoutType, NodeKind, Presentation,
    RootImage, Slide, TextLeaf, TextStyle,
};
pub use parser::{IngestMode, LayoutPolicy, ParserOptions, RescanStrategy, SlideParser};

use std::path::Path;

/// Parse complete markup into a presentation.
///
/// Elements still open at the end of the text are force-closed.
///
/// # Example
///
/// ```
/// let deck = slidemark::parse_str("<SECTION><H1>Hello</H1>");
/// assert_eq!(deck.slides.len(), 1);
/// assert_eq!(deck.title.as_deref(), Some("Hello"));
/// ```
pub fn parse_str(markup: &str) -> Presentation {
    parse_str_with_options(markup, ParserOptions::default())
}

/// Parse complete markup with parser options.
pub fn parse_str_with_options(markup: &str, options: ParserOptions) -> Presentation {
    let mut parser = SlideParser::with_options(options);
    parser.ingest(markup);
    parser.finalize();
    parser.into_presentation()
}

/// Parse markup from bytes, which must be valid UTF-8.
///
/// # Example
///
/// ```
/// let deck = slidemark::parse_bytes(b"<SECTION><P>x</P></SECTION>")?;
/// assert_eq!(deck.slides.len(), 1);
///
/// assert!(slidemark::parse_bytes(&[0xff, 0xfe]).is_err());
/// # Ok::<(), slidemark::Error>(())
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Presentation> {
    let mut parser = SlideParser::new();
    parser.ingest_bytes(data)?;
    parser.finalize();
    Ok(parser.into_presentation())
}

/// Parse a markup file.
///
/// # Example
///
/// ```no_run
/// use slidemark::parse_file;
///
/// let deck = parse_file("deck.xml")?;
/// println!("Slides: {}", deck.slides.len());
/// # Ok::<(), slidemark::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Presentation> {
    let data = std::fs::read(path.as_ref())?;
    parse_bytes(&data)
}

/// Extract plain text from a markup file.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let deck = parse_file(path)?;
    Ok(deck.plain_text())
}

/// Convert a markup file to Markdown.
///
/// # Example
///
/// ```no_run
/// let markdown = slidemark::to_markdown("deck.xml")?;
/// std::fs::write("deck.md", markdown)?;
/// # Ok::<(), slidemark::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    let deck = parse_file(path)?;
    render::to_markdown(&deck, &render::RenderOptions::default())
}

/// Convert a markup file to Markdown with options.
pub fn to_markdown_with_options(
    path: impl AsRef<Path>,
    options: &render::RenderOptions,
) -> Result<String> {
    let deck = parse_file(path)?;
    render::to_markdown(&deck, options)
}
