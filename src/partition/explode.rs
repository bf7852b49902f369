// src/partition/explode.rs
// =============================================================================
// Explode: one long document in, a directory of section files plus index.md
// out.
//
// Steps:
// 1. Split the raw text into sections (split.rs)
// 2. Give every section a unique "<slug>.md" name
// 3. Write each section with its heading lifted from ## to #
// 4. Build the table of contents from the parsed heading list (index.rs)
//    and write index.md
// 5. Warn about any section file the index does not link to, since
//    assemble will not pick it up
//
// A failed section write is logged and the run continues. A failed index
// write is fatal. Each file is written to a temp file and renamed into
// place, so a crash never leaves a half-written section behind, and running
// explode again simply overwrites the same names.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::markdown::extract_headings;
use crate::slug::FilenameAllocator;

use super::index::{build_entries, render_index, unlinked_files};
use super::split::split_sections;

pub const INDEX_FILENAME: &str = "index.md";

// A section ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFile {
    pub filename: String,
    pub heading_text: String,
    /// Zero-based source line of the section's heading
    pub line: usize,
    pub content: String,
}

// What explode did, for printing or JSON output
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExplodeSummary {
    pub sections_found: usize,
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// Written section files that index.md does not link to
    pub unlinked: Vec<PathBuf>,
    /// None when the document had no sections and nothing was written
    pub index: Option<PathBuf>,
}

// Explodes `input` into `output_dir`
//
// Returns: Err only when the input is missing/unreadable, the output
// directory cannot be created, or index.md cannot be written.
pub fn explode(input: &Path, output_dir: &Path) -> Result<ExplodeSummary> {
    let text = read_document(input)?;

    let lines: Vec<&str> = text.lines().collect();
    let document = split_sections(&lines);

    if !document.has_sections() {
        tracing::warn!("no sections found in {}; nothing written", input.display());
        return Ok(ExplodeSummary::default());
    }

    if document.title.is_none() {
        tracing::warn!(
            "{} has no level-1 title; the index will use a placeholder",
            input.display()
        );
    }
    if document.preamble.iter().any(|line| !line.trim().is_empty()) {
        tracing::warn!(
            "content between the title and the first section of {} is not carried into any file",
            input.display()
        );
    }
    if document.dropped_lines > 0 {
        tracing::warn!(
            "{} line(s) under a second level-1 heading in {} are not carried into any file",
            document.dropped_lines,
            input.display()
        );
    }

    fs::create_dir_all(output_dir).map_err(|source| Error::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut names = FilenameAllocator::new();
    names.reserve(INDEX_FILENAME);
    let files: Vec<SectionFile> = document
        .sections
        .iter()
        .map(|section| {
            let (filename, collided) = names.allocate(&section.heading_text);
            tracing::debug!(
                "section '{}' spans lines {}-{}",
                section.heading_text,
                section.start_line + 1,
                section.end_line + 1
            );
            if collided {
                tracing::warn!(
                    "section '{}' (line {}) shares a file name with an earlier section; writing {}",
                    section.heading_text,
                    section.start_line + 1,
                    filename
                );
            }
            SectionFile {
                filename,
                heading_text: section.heading_text.clone(),
                line: section.start_line,
                content: section.standalone_content(),
            }
        })
        .collect();

    let mut summary = ExplodeSummary {
        sections_found: files.len(),
        ..ExplodeSummary::default()
    };

    for file in &files {
        let path = output_dir.join(&file.filename);
        match write_file(&path, &file.content) {
            Ok(()) => {
                tracing::debug!("wrote {}", path.display());
                summary.written.push(path);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                summary.failed.push(path);
            }
        }
    }

    let index_path = output_dir.join(INDEX_FILENAME);
    let entries = build_entries(&extract_headings(&text), &files);
    write_file(&index_path, &render_index(&entries))?;
    tracing::info!("wrote index {}", index_path.display());

    for file in unlinked_files(&entries, &files) {
        let path = output_dir.join(&file.filename);
        tracing::warn!(
            "section '{}' (line {}) is not a heading to the Markdown parser; {} is not linked from the index",
            file.heading_text,
            file.line + 1,
            path.display()
        );
        summary.unlinked.push(path);
    }

    summary.index = Some(index_path);
    Ok(summary)
}

pub(super) fn read_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

// Writes a whole file or nothing: content goes to a hidden sibling temp
// file which is then renamed over the target
pub(super) fn write_file(path: &Path, content: &str) -> Result<()> {
    let to_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp, content).map_err(to_error)?;
    if let Err(source) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(to_error(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DOC: &str = "# Guide\n\nWelcome.\n\n## Install\n\nRun it.\n\n### From source\n\n```sh\n# build\ncargo build\n```\n\n## Usage\n\nUse it.\n";

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_explode_writes_sections_and_index() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("guide.md");
        fs::write(&input, DOC).unwrap();
        let out = tmp.path().join("guide");

        let summary = explode(&input, &out).unwrap();

        assert_eq!(summary.sections_found, 2);
        assert!(summary.failed.is_empty());
        assert_eq!(listing(&out), vec!["index.md", "install.md", "usage.md"]);

        let install = fs::read_to_string(out.join("install.md")).unwrap();
        assert_eq!(
            install,
            "# Install\n\nRun it.\n\n### From source\n\n```sh\n# build\ncargo build\n```\n"
        );

        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.starts_with("# Guide\n\n## Table of Contents\n\n"));
        assert!(index.contains("  - [Install](./install.md)\n"));
        assert!(index.contains("    - [From source](./install.md#from-source)\n"));
        assert!(index.contains("  - [Usage](./usage.md)\n"));
    }

    #[test]
    fn test_no_sections_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("short.md");
        fs::write(&input, "# Just a title\n\nBody.\n").unwrap();
        let out = tmp.path().join("out");

        let summary = explode(&input, &out).unwrap();

        assert_eq!(summary.sections_found, 0);
        assert!(summary.index.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = explode(&tmp.path().join("nope.md"), tmp.path()).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_colliding_headings_get_suffixes() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("doc.md");
        fs::write(&input, "# T\n## Notes\none\n## notes!\ntwo\n").unwrap();
        let out = tmp.path().join("out");

        explode(&input, &out).unwrap();

        assert_eq!(listing(&out), vec!["index.md", "notes-2.md", "notes.md"]);
        assert_eq!(fs::read_to_string(out.join("notes.md")).unwrap(), "# Notes\none\n");
        assert_eq!(fs::read_to_string(out.join("notes-2.md")).unwrap(), "# notes!\ntwo\n");

        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("[Notes](./notes.md)"));
        assert!(index.contains("[notes!](./notes-2.md)"));
    }

    #[test]
    fn test_section_named_index_does_not_clobber_index() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("doc.md");
        fs::write(&input, "# T\n## Index\nterms\n").unwrap();
        let out = tmp.path().join("out");

        explode(&input, &out).unwrap();

        assert_eq!(listing(&out), vec!["index-2.md", "index.md"]);
        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("  - [Index](./index-2.md)"));
    }

    #[test]
    fn test_headings_with_inline_markup_are_linked() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("doc.md");
        fs::write(&input, "# T\n## See [docs](./docs.md)\n## Q&amp;A\n## `arr[0]` indexing\n").unwrap();
        let out = tmp.path().join("out");

        let summary = explode(&input, &out).unwrap();

        assert!(summary.unlinked.is_empty());
        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("  - [See docs](./see-docsdocsmd.md)\n"));
        assert!(index.contains("  - [Q\\&A](./qampa.md)\n"));
        assert!(index.contains("  - [arr\\[0\\] indexing](./arr0-indexing.md)\n"));
    }

    #[test]
    fn test_section_hidden_in_html_block_is_reported_unlinked() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("doc.md");
        fs::write(&input, "# T\n\n## Shown\n\n<details>\n## Hidden\n</details>\n").unwrap();
        let out = tmp.path().join("out");

        let summary = explode(&input, &out).unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.unlinked, vec![out.join("hidden.md")]);
        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("  - [Shown](./shown.md)\n"));
        assert!(!index.contains("hidden.md"));
    }

    #[test]
    fn test_explode_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("guide.md");
        fs::write(&input, DOC).unwrap();
        let out = tmp.path().join("out");

        explode(&input, &out).unwrap();
        let first: Vec<(String, String)> = listing(&out)
            .into_iter()
            .map(|name| {
                let content = fs::read_to_string(out.join(&name)).unwrap();
                (name, content)
            })
            .collect();

        fs::remove_dir_all(&out).unwrap();
        explode(&input, &out).unwrap();
        let second: Vec<(String, String)> = listing(&out)
            .into_iter()
            .map(|name| {
                let content = fs::read_to_string(out.join(&name)).unwrap();
                (name, content)
            })
            .collect();

        assert_eq!(first, second);
    }
}
