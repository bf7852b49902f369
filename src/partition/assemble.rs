// src/partition/assemble.rs
// =============================================================================
// Assemble: the inverse of explode.
//
// Steps:
// 1. Read <dir>/index.md (missing index is fatal)
// 2. Take the main title from its first level-1 heading (none is fatal)
// 3. Walk the table of contents and collect the section files, in order.
//    A section entry is a bullet indented by exactly two spaces whose link
//    points at a relative file. Anchored links to the same file count once.
// 4. Read each file, turn its first heading from # back into ##, and glue
//    everything together under "# <title>"
//
// Only the first heading line of each file changes. Explode only changed
// that one line too, which is what makes explode -> assemble stable.
// A section file that is missing or unreadable is skipped with a warning.
// =============================================================================

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::markdown::extract_headings;

use super::explode::{write_file, INDEX_FILENAME};
use super::split::{parse_atx_heading, with_heading_level, FenceTracker};

// "  - [text](target)" with exactly two spaces of indentation. The text may
// contain backslash escapes such as "\]".
static SECTION_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {2}[-*+][ \t]+\[(?P<text>(?:\\.|[^\]\\])*)\]\((?P<target>[^)\s]+)\)")
        .expect("section entry pattern is valid")
});

// A section file referenced from the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssembleSummary {
    pub title: String,
    pub included: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub output: PathBuf,
}

// Reassembles the directory `dir` into the single file `output`
pub fn assemble(dir: &Path, output: &Path) -> Result<AssembleSummary> {
    let index_path = dir.join(INDEX_FILENAME);
    if !index_path.is_file() {
        return Err(Error::IndexNotFound(index_path));
    }
    let index = fs::read_to_string(&index_path).map_err(|source| Error::Read {
        path: index_path.clone(),
        source,
    })?;

    let title = extract_headings(&index)
        .into_iter()
        .find(|heading| heading.level == 1)
        .map(|heading| heading.text)
        .ok_or_else(|| Error::MissingMainTitle(index_path.clone()))?;

    let entries = section_entries(&index);
    tracing::debug!("index lists {} section file(s)", entries.len());

    let mut document = format!("# {}\n", title);
    let mut included = Vec::new();
    let mut missing = Vec::new();

    for entry in entries {
        let path = dir.join(&entry.filename);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("section file missing, skipping: {}", path.display());
                missing.push(path);
                continue;
            }
            Err(e) => {
                tracing::warn!("could not read {}, skipping: {}", path.display(), e);
                missing.push(path);
                continue;
            }
        };

        tracing::debug!("including section '{}' from {}", entry.text, path.display());
        document.push('\n');
        document.push_str(&restore_section(&content, &path));
        included.push(path);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_file(output, &document)?;

    Ok(AssembleSummary {
        title,
        included,
        missing,
        output: output.to_path_buf(),
    })
}

// Collects the section files named by the table of contents, in order,
// each file at most once
pub fn section_entries(index: &str) -> Vec<TocEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for line in index.lines() {
        let Some(captures) = SECTION_ENTRY.captures(line) else {
            continue;
        };

        let target = &captures["target"];
        let Some(filename) = relative_file(target) else {
            continue;
        };

        if seen.insert(filename.clone()) {
            entries.push(TocEntry {
                filename,
                text: unescape_text(&captures["text"]),
            });
        }
    }

    entries
}

// "arr\[0\]" -> "arr[0]"
fn unescape_text(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            other => unescaped.push(other),
        }
    }
    unescaped
}

// "./a.md#x" -> "a.md"; bare anchors and URLs with a scheme -> None
fn relative_file(target: &str) -> Option<String> {
    if target.starts_with('#') || target.contains("://") || target.starts_with("mailto:") {
        return None;
    }

    let path = target.split('#').next().unwrap_or(target);
    let path = path.strip_prefix("./").unwrap_or(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

// Puts a section file back at level 2: the first heading line outside code
// fences goes from # to ##, nothing else changes. Trailing blank lines are
// trimmed so the blank-line separation between sections stays single.
fn restore_section(content: &str, path: &Path) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut fence = FenceTracker::default();
    let mut restored = false;

    for line in content.lines() {
        if !restored && !fence.is_open() {
            if let Some((level, _)) = parse_atx_heading(line) {
                restored = true;
                if level == 1 {
                    lines.push(with_heading_level(line, 2));
                    fence.observe(line);
                    continue;
                }
                tracing::warn!(
                    "first heading of {} is level {}, not 1; left unchanged",
                    path.display(),
                    level
                );
            }
        }
        fence.observe(line);
        lines.push(line.to_string());
    }

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut section = lines.join("\n");
    section.push('\n');
    section
}
