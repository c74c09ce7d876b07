//! Streaming slide parser.
//!
//! [`SlideParser`] accepts the markup generated so far, re-derives the
//! slide list from it, and exposes every slide whose SECTION has closed.
//! Results depend only on the buffer content, so repeated or overlapping
//! ingests are harmless.

mod materialize;
mod options;

pub use materialize::materialize;
pub use options::{IngestMode, LayoutPolicy, ParserOptions, RescanStrategy};

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::markup::{Tokenizer, TreeBuilder};
use crate::model::{Presentation, Slide};

/// Scan state saved right after a slide closed outside any other SECTION.
#[derive(Debug, Clone)]
struct Checkpoint {
    /// Byte offset just past the SECTION close tag
    offset: usize,
    /// Builder state at that offset (only wrapper elements are open)
    builder: TreeBuilder,
    /// Number of slides closed before the offset
    slide_count: usize,
}

/// Incremental parser turning streamed markup into slides.
///
/// # Example
///
/// ```
/// use slidemark::SlideParser;
///
/// let mut parser = SlideParser::new();
/// parser.ingest("<PRESENTATION><SECTION><H1>Intro</H1></SECTION><SECTION><H1>Ne");
/// assert_eq!(parser.all_slides().len(), 1);
///
/// parser.finalize();
/// assert_eq!(parser.all_slides().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlideParser {
    options: ParserOptions,
    buffer: String,
    slides: Vec<Slide>,
    builder: TreeBuilder,
    /// Bytes of the buffer consumed by the last scan
    consumed: usize,
    checkpoint: Option<Checkpoint>,
    finalized: bool,
}

impl SlideParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options.
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Parser options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// The markup received so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Check if `finalize` has run since the last ingest or reset.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Feed markup text and re-derive the slide list.
    ///
    /// With the default [`IngestMode::Auto`] the text is taken as the full
    /// markup so far when it extends the buffer, and appended otherwise.
    pub fn ingest(&mut self, text: &str) {
        let resumable = self.update_buffer(text);
        if !resumable {
            self.checkpoint = None;
        }
        self.finalized = false;
        self.scan();
    }

    /// Feed raw bytes, which must be valid UTF-8.
    ///
    /// On invalid input the parser state is left unchanged.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(bytes)?;
        self.ingest(text);
        Ok(())
    }

    /// Force-close every open element so the last slide is not lost.
    ///
    /// An incomplete trailing tag is discarded. Calling this again before
    /// the next ingest has no effect.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        if self.consumed < self.buffer.len() {
            debug!(
                bytes = self.buffer.len() - self.consumed,
                "discarding incomplete trailing tag"
            );
        }

        self.builder.finish();
        for section in self.builder.take_completed() {
            let id = Slide::id_for_index(self.slides.len());
            self.slides.push(materialize(&section, id, &self.options));
        }
        self.finalized = true;
    }

    /// Slides whose SECTION has closed (or was force-closed by `finalize`).
    pub fn all_slides(&self) -> &[Slide] {
        &self.slides
    }

    /// The slide currently being generated, as `finalize` would produce it.
    pub fn pending_slide(&self) -> Option<Slide> {
        if self.finalized {
            return None;
        }
        let section = self.builder.open_section()?;
        let id = Slide::id_for_index(self.slides.len());
        Some(materialize(&section, id, &self.options))
    }

    /// Clear all state; options are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.slides.clear();
        self.builder = TreeBuilder::new();
        self.consumed = 0;
        self.checkpoint = None;
        self.finalized = false;
    }

    /// Snapshot the parsed slides as a presentation.
    pub fn presentation(&self) -> Presentation {
        let mut presentation = Presentation::from_slides(self.slides.clone());
        if let Some(title) = self.declared_title() {
            presentation.title = Some(title);
        }
        presentation
    }

    /// Consume the parser, returning the parsed slides as a presentation.
    pub fn into_presentation(self) -> Presentation {
        let title = self.declared_title();
        let mut presentation = Presentation::from_slides(self.slides);
        if title.is_some() {
            presentation.title = title;
        }
        presentation
    }

    fn declared_title(&self) -> Option<String> {
        self.builder
            .presentation_attributes()
            .and_then(|attrs| attrs.get("title"))
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Apply `text` to the buffer. Returns false when the buffer no longer
    /// starts with the text covered by the checkpoint.
    fn update_buffer(&mut self, text: &str) -> bool {
        let append = match self.options.ingest_mode {
            IngestMode::Cumulative => false,
            IngestMode::Delta => true,
            IngestMode::Auto => {
                let extends = self.buffer.is_empty() || text.starts_with(self.buffer.as_str());
                if !extends {
                    warn!(
                        buffered = self.buffer.len(),
                        received = text.len(),
                        "ingested text does not extend the buffer, appending it as a delta"
                    );
                }
                !extends
            }
        };

        if append {
            self.buffer.push_str(text);
            return true;
        }

        let resumable = self
            .checkpoint
            .as_ref()
            .is_some_and(|cp| text.as_bytes().starts_with(&self.buffer.as_bytes()[..cp.offset]));
        self.buffer.clear();
        self.buffer.push_str(text);
        resumable
    }

    fn scan(&mut self) {
        let checkpointing = self.options.rescan == RescanStrategy::Checkpoint;
        let (start, mut builder, slide_count) = match &self.checkpoint {
            Some(cp) if checkpointing => (cp.offset, cp.builder.clone(), cp.slide_count),
            _ => (0, TreeBuilder::new(), 0),
        };
        self.slides.truncate(slide_count);

        let mut tokenizer = Tokenizer::new(&self.buffer[start..]);
        while let Some(event) = tokenizer.next() {
            builder.handle(event);

            let completed = builder.take_completed();
            if completed.is_empty() {
                continue;
            }
            for section in completed {
                let id = Slide::id_for_index(self.slides.len());
                self.slides.push(materialize(&section, id, &self.options));
            }

            if checkpointing && builder.at_boundary() && tokenizer.at_rest() {
                self.checkpoint = Some(Checkpoint {
                    offset: start + tokenizer.position(),
                    builder: builder.clone(),
                    slide_count: self.slides.len(),
                });
            }
        }

        self.consumed = start + tokenizer.position();
        self.builder = builder;

        trace!(
            buffer = self.buffer.len(),
            resumed_at = start,
            consumed = self.consumed,
            slides = self.slides.len(),
            open = self.builder.depth(),
            "scanned markup"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayoutType, NodeKind};

    const DECK: &str = r#"<PRESENTATION title="Roadmap">
<SECTION layout="left"><IMG query="mountain sunrise" /><H1>Vision</H1></SECTION>
<SECTION><H2>Plan</H2><BULLETS><DIV><H3>One</H3></DIV></BULLETS></SECTION>
<SECTION><H2>Tail</H2><P>unfinished"#;

    #[test]
    fn test_closed_slides_only() {
        let mut parser = SlideParser::new();
        parser.ingest(DECK);
        let slides = parser.all_slides();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].id, "slide-1");
        assert_eq!(slides[0].layout_type, Some(LayoutType::Left));
        assert_eq!(slides[1].layout_type, Some(LayoutType::Bullets));
        assert!(!parser.is_finalized());
    }

    #[test]
    fn test_finalize_promotes_pending() {
        let mut parser = SlideParser::new();
        parser.ingest(DECK);
        let pending = parser.pending_slide().unwrap();
        assert_eq!(pending.id, "slide-3");

        parser.finalize();
        assert_eq!(parser.all_slides().len(), 3);
        assert_eq!(parser.all_slides()[2], pending);
        assert!(parser.pending_slide().is_none());

        // A second finalize is a no-op
        parser.finalize();
        assert_eq!(parser.all_slides().len(), 3);
    }

    #[test]
    fn test_ingest_idempotent() {
        let mut once = SlideParser::new();
        once.ingest(DECK);

        let mut twice = SlideParser::new();
        twice.ingest(DECK);
        twice.ingest(DECK);

        assert_eq!(once.all_slides(), twice.all_slides());
        assert_eq!(once.buffer(), twice.buffer());
    }

    #[test]
    fn test_ingest_after_finalize_unfreezes() {
        let mut parser = SlideParser::new();
        parser.ingest("<SECTION><H1>A");
        parser.finalize();
        assert_eq!(parser.all_slides().len(), 1);

        parser.ingest("<SECTION><H1>A</H1></SECTION><SECTION><H1>B</H1></SECTION>");
        assert!(!parser.is_finalized());
        let titles: Vec<_> = parser.all_slides().iter().filter_map(Slide::title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_checkpoint_resumes() {
        let mut parser = SlideParser::new();
        parser.ingest("<PRESENTATION><SECTION><H1>A</H1></SECTION>");
        let offset = parser.checkpoint.as_ref().map(|cp| cp.offset);
        assert_eq!(offset, Some(parser.buffer().len()));

        parser.ingest("<PRESENTATION><SECTION><H1>A</H1></SECTION><SECTION><H1>B</H1></SECTION>");
        assert_eq!(parser.all_slides().len(), 2);
        assert_eq!(parser.all_slides()[1].id, "slide-2");

        // Text that does not extend the buffer is appended
        parser.ingest("<SECTION><H1>Z</H1></SECTION>");
        assert_eq!(parser.all_slides().len(), 3);
        assert_eq!(
            parser.buffer(),
            "<PRESENTATION><SECTION><H1>A</H1></SECTION><SECTION><H1>B</H1></SECTION><SECTION><H1>Z</H1></SECTION>"
        );
    }

    #[test]
    fn test_rewritten_prefix_drops_checkpoint() {
        let mut parser =
            SlideParser::with_options(ParserOptions::new().with_ingest_mode(IngestMode::Cumulative));
        parser.ingest("<SECTION><H1>A</H1></SECTION><SECTION><H1>B</H1></SECTION>");
        assert!(parser.checkpoint.is_some());

        parser.ingest("<SECTION><H1>X</H1></SECTION>");
        let titles: Vec<_> = parser.all_slides().iter().filter_map(Slide::title).collect();
        assert_eq!(titles, vec!["X"]);
    }

    #[test]
    fn test_cumulative_mode_replaces() {
        let mut parser =
            SlideParser::with_options(ParserOptions::new().with_ingest_mode(IngestMode::Cumulative));
        parser.ingest("<SECTION><H1>A</H1></SECTION>");
        parser.ingest("<SECTION><H1>B</H1></SECTION>");
        assert_eq!(parser.all_slides().len(), 1);
        assert_eq!(parser.all_slides()[0].title().as_deref(), Some("B"));
    }

    #[test]
    fn test_delta_ingest() {
        let mut parser = SlideParser::new();
        parser.ingest("<SECTION><H1>");
        parser.ingest("Content");
        parser.ingest("</H1></SECTION>");
        assert_eq!(parser.all_slides().len(), 1);
        assert_eq!(parser.all_slides()[0].content[0].kind, NodeKind::H1);
        assert_eq!(parser.all_slides()[0].title().as_deref(), Some("Content"));
    }

    #[test]
    fn test_invalid_bytes_leave_state() {
        let mut parser = SlideParser::new();
        parser.ingest("<SECTION><H1>A</H1></SECTION>");
        let result = parser.ingest_bytes(&[b'<', 0xff, 0xfe]);
        assert!(matches!(result, Err(crate::Error::MalformedInput(_))));
        assert_eq!(parser.buffer(), "<SECTION><H1>A</H1></SECTION>");
        assert_eq!(parser.all_slides().len(), 1);

        parser.ingest_bytes("<SECTION><H1>A</H1></SECTION>".as_bytes()).unwrap();
        assert_eq!(parser.all_slides().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut parser = SlideParser::new();
        parser.ingest(DECK);
        parser.finalize();
        parser.reset();
        assert!(parser.all_slides().is_empty());
        assert!(parser.buffer().is_empty());
        assert!(!parser.is_finalized());
        assert!(parser.pending_slide().is_none());

        parser.ingest("<SECTION><H1>Again</H1></SECTION>");
        assert_eq!(parser.all_slides()[0].id, "slide-1");
    }

    #[test]
    fn test_presentation_title() {
        let mut parser = SlideParser::new();
        parser.ingest(DECK);
        parser.finalize();
        assert_eq!(parser.presentation().title.as_deref(), Some("Roadmap"));

        let mut parser = SlideParser::new();
        parser.ingest("<SECTION><H1>Derived</H1></SECTION>");
        let deck = parser.into_presentation();
        assert_eq!(deck.title.as_deref(), Some("Derived"));
        assert_eq!(deck.len(), 1);
    }
}
