//! Markup scanning: tag vocabulary, event tokenizer and element tree builder.

pub mod tokenizer;
pub mod tree;
pub mod vocab;

pub use tokenizer::{tokenize, Event, OpenTag, Tokenizer};
pub use tree::{Element, Node, TreeBuilder};
pub use vocab::{InlineMark, Tag};
