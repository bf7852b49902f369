// src/checker/crawl.rs
// =============================================================================
// This module runs a link check over one document, and optionally over every
// local Markdown file it (transitively) links to.
//
// How it works:
// 1. Start with the given document in a queue
// 2. Extract its links, drop duplicate URLs, check the rest concurrently
// 3. If recursive, queue every local .md target that checked out ok and
//    has not been visited yet
// 4. Repeat until the queue is empty
//
// The visited set is only touched by this loop, never by the concurrent
// checks, so two documents that link to each other are each scanned once.
// It lives for one call and is returned as part of the report.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::markdown::extract_links;

use super::classify::{check_link, LinkCheckResult};
use super::http::build_client;

// Options for one check-links run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Follow local Markdown links into other documents
    pub recursive: bool,
    /// Per-request timeout for remote links
    pub timeout: Duration,
    /// Maximum number of links checked at once
    pub concurrency: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            timeout: Duration::from_secs(10),
            concurrency: 50,
        }
    }
}

// Results for one scanned document, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub results: Vec<LinkCheckResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ok: usize,
    pub broken: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub documents: Vec<DocumentReport>,
    /// Every document scanned, in visit order
    pub visited: Vec<PathBuf>,
    pub summary: Summary,
}

impl CheckReport {
    pub fn has_broken_links(&self) -> bool {
        self.summary.broken > 0
    }
}

// Checks the links of `input`, recursing into local Markdown files if asked
//
// Returns: Err only if `input` itself is missing or unreadable, or the HTTP
// client cannot be built. Anything wrong with a linked document is a warning.
pub async fn check_document(input: &Path, options: &CheckOptions) -> Result<CheckReport> {
    if !input.is_file() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }
    let root = canonical(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let client = build_client(options.timeout)?;

    // Queue of documents to scan, and documents already queued or scanned
    let mut queue = VecDeque::from([root.clone()]);
    let mut visited = HashSet::from([root.clone()]);
    let mut visit_order = Vec::new();
    let mut documents = Vec::new();

    while let Some(source) = queue.pop_front() {
        let text = match tokio::fs::read_to_string(&source).await {
            Ok(text) => text,
            Err(source_error) if source == root => {
                return Err(Error::Read {
                    path: source,
                    source: source_error,
                });
            }
            Err(e) => {
                tracing::warn!("could not read linked document {}: {}", source.display(), e);
                continue;
            }
        };
        visit_order.push(source.clone());

        let urls = unique_urls(&text);
        tracing::info!("checking {} unique link(s) in {}", urls.len(), source.display());

        let source_dir = source.parent().map(Path::to_path_buf).unwrap_or_default();

        // Create a stream of futures, one per URL, and run up to
        // `concurrency` of them at once. buffered() (not buffer_unordered)
        // keeps results in discovery order.
        let results: Vec<LinkCheckResult> = stream::iter(urls)
            .map(|url| {
                let client = client.clone();
                let source_dir = source_dir.clone();
                async move { check_link(&client, &url, &source_dir).await }
            })
            .buffered(options.concurrency.max(1))
            .filter_map(|result| async move { result })
            .collect()
            .await;

        if options.recursive {
            for target in markdown_targets(&results) {
                match canonical(&target) {
                    Ok(path) => {
                        if visited.insert(path.clone()) {
                            tracing::debug!("queueing linked document {}", path.display());
                            queue.push_back(path);
                        }
                    }
                    Err(e) => tracing::warn!("could not resolve {}: {}", target.display(), e),
                }
            }
        }

        documents.push(DocumentReport { source, results });
    }

    let summary = summarize(&documents);
    Ok(CheckReport {
        documents,
        visited: visit_order,
        summary,
    })
}

// URLs in first-seen order, each once
fn unique_urls(markdown: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_links(markdown)
        .into_iter()
        .inspect(|link| tracing::trace!("found {:?} link {}", link.origin, link.url))
        .map(|link| link.url)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

// Local targets that exist and look like Markdown documents
fn markdown_targets(results: &[LinkCheckResult]) -> Vec<PathBuf> {
    results
        .iter()
        .filter(|result| result.is_ok())
        .filter_map(|result| result.target.clone())
        .filter(|path| is_markdown(path))
        .collect()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

fn canonical(path: &Path) -> std::io::Result<PathBuf> {
    std::fs::canonicalize(path)
}

fn summarize(documents: &[DocumentReport]) -> Summary {
    let mut summary = Summary::default();
    for result in documents.iter().flat_map(|document| &document.results) {
        summary.total += 1;
        if result.is_ok() {
            summary.ok += 1;
        } else if result.is_broken() {
            summary.broken += 1;
        } else if result.is_skipped() {
            summary.skipped += 1;
        }
    }
    summary
}
