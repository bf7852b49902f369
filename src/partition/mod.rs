// src/partition/mod.rs
// =============================================================================
// This module splits a document into section files and puts it back together.
//
// Submodules:
// - split: raw-line splitter (title, preamble, level-2 sections)
// - index: table-of-contents builder for index.md
// - explode: document -> directory of section files + index.md
// - assemble: directory -> document
//
// Layout produced by explode and required by assemble:
//   <dir>/index.md
//   <dir>/<slug>.md   one per level-2 section
// =============================================================================

mod assemble;
mod explode;
mod index;
mod split;

pub use assemble::assemble;
pub use explode::explode;
