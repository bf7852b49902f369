// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - classify: decides what a URL is (anchor, email, web, local file) and
//   checks it
// - http: makes HTTP requests to check if remote links are alive
// - crawl: walks one document, or a web of local documents, and collects
//   a verdict for every unique URL
//
// This file (mod.rs) is the module root - it re-exports the public API that
// main.rs uses.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod classify;
mod crawl;
mod http;

// Re-export public items from submodules
pub use classify::{BrokenReason, LinkCheckResult, LinkVerdict, SkipReason};
pub use crawl::{check_document, CheckOptions, CheckReport};
