// src/partition/index.rs
// =============================================================================
// Builds index.md: the main title plus a table of contents that links every
// heading of the original document to where it now lives.
//
// Link targets:
//   level 1  -> #table-of-contents
//   level 2  -> ./<section file>              (anchor if no file exists)
//   level 3+ -> ./<enclosing section file>#<slug>   (anchor if none)
//
// The heading list comes from the parser, the file list from the splitter.
// A level-2 heading owns the file whose section starts on the same source
// line, so "## See [docs](./docs.md)" (parser text "See docs") still finds
// see-docsdocsmd.md. Link text is escaped so a "]" in a heading cannot end
// the link early.
// =============================================================================

use std::collections::HashSet;

use crate::markdown::HeadingRef;
use crate::slug::slugify;

use super::explode::SectionFile;

pub const TOC_HEADING: &str = "Table of Contents";
const TOC_ANCHOR: &str = "#table-of-contents";
const FALLBACK_TITLE: &str = "Untitled Document";

// One line of the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub heading: HeadingRef,
    /// Number of two-space indentation units (level - 1)
    pub indent: usize,
    pub link_target: String,
}

impl IndexEntry {
    fn render(&self) -> String {
        format!(
            "{}- [{}]({})",
            "  ".repeat(self.indent),
            escape_text(&self.heading.text),
            self.link_target
        )
    }
}

// Derives the link target for every heading
pub fn build_entries(headings: &[HeadingRef], files: &[SectionFile]) -> Vec<IndexEntry> {
    let mut entries = Vec::with_capacity(headings.len());

    // The file the current level-2 heading resolved to
    let mut enclosing: Option<&str> = None;

    for heading in headings {
        let anchor = slugify(&heading.text);

        let link_target = match heading.level {
            1 => {
                enclosing = None;
                TOC_ANCHOR.to_string()
            }
            2 => {
                enclosing = files
                    .iter()
                    .find(|file| file.line == heading.line)
                    .map(|file| file.filename.as_str());
                match enclosing {
                    Some(filename) => format!("./{}", filename),
                    None => format!("#{}", anchor),
                }
            }
            _ => match enclosing {
                Some(filename) => format!("./{}#{}", filename, anchor),
                None => format!("#{}", anchor),
            },
        };

        tracing::trace!("heading #{} -> {}", heading.ordinal_index, link_target);
        entries.push(IndexEntry {
            heading: heading.clone(),
            indent: usize::from(heading.level.saturating_sub(1)),
            link_target,
        });
    }

    entries
}

// Section files no level-2 entry links to. assemble would never see them.
pub fn unlinked_files<'a>(entries: &[IndexEntry], files: &'a [SectionFile]) -> Vec<&'a SectionFile> {
    let linked: HashSet<&str> = entries
        .iter()
        .filter(|entry| entry.heading.level == 2)
        .filter_map(|entry| entry.link_target.strip_prefix("./"))
        .collect();

    files
        .iter()
        .filter(|file| !linked.contains(file.filename.as_str()))
        .collect()
}

// Backslash-escapes the characters that would end or restyle link text
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']' | '`' | '*' | '_' | '<' | '&') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// Renders the full index document
//
// Output shape:
//   # <title>
//
//   ## Table of Contents
//
//   - [Title](#table-of-contents)
//     - [A](./a.md)
//       - [A.1](./a.md#a1)
pub fn render_index(entries: &[IndexEntry]) -> String {
    let title = entries
        .iter()
        .find(|entry| entry.heading.level == 1)
        .map(|entry| escape_text(&entry.heading.text))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let mut index = format!("# {}\n\n## {}\n\n", title, TOC_HEADING);

    if entries.is_empty() {
        index.push_str("_No headings found._\n");
        return index;
    }

    for entry in entries {
        index.push_str(&entry.render());
        index.push('\n');
    }

    index
}
