//! Plain-text input: heuristic sectionizing for text without recognized markup.

pub mod sectionizer;

pub use sectionizer::{sectionize, strip_markdown_emphasis};
