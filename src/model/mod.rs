//! Slide document model.
//!
//! This module defines the structures the parser materializes from markup.
//! They serialize to the JSON shape consumed by export and persistence
//! layers: camelCase slide fields, lowercase node `type` tags, and text
//! leaves carrying only the style flags that are set.

mod node;
mod presentation;
mod slide;

pub use node::*;
pub use presentation::*;
pub use slide::*;
