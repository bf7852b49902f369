// src/markdown/mod.rs
// =============================================================================
// This module is the Markdown parser collaborator.
//
// The rest of the crate never walks a syntax tree itself. It asks this
// module two questions about a document's text:
// - headings: which headings exist, at what level, in what order
// - links: which URLs the document points at (inline links, autolinks,
//   reference definitions, and <a href> anchors inside raw HTML)
//
// Both are plain functions over &str. There is no shared parser instance;
// every call builds its own pulldown-cmark parser and throws it away.
//
// Submodules:
// - headings: heading enumeration
// - links: link and reference-definition enumeration
// =============================================================================

mod headings;
mod links;

pub use headings::{extract_headings, HeadingRef};
pub use links::extract_links;

use pulldown_cmark::Options;

// Options shared by every parse in this crate
//
// Footnotes must be on: without them "[^1]: note" is read as a reference
// definition pointing at a file called "note".
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}
