// src/partition/split.rs
// =============================================================================
// Splits a document's raw lines into a title, a preamble, and an ordered list
// of level-2 sections.
//
// This works on raw lines on purpose. Parsing to a tree and printing it back
// would reflow lists, rewrite code fences and lose blank lines; working line
// by line keeps every section byte-for-byte as the author wrote it. The
// parsed tree is only used elsewhere to enumerate headings and links.
//
// How a line is treated:
// - "# ..."  closes the open section. The first one is the title; later ones
//            are otherwise ignored, and the lines after them are dropped
//            until the next "## ..."
// - "## ..." closes the open section and opens a new one
// - other    appended to the open section, or to the preamble if no section
//            has been opened yet
//
// Lines inside ``` or ~~~ fences are never headings.
// =============================================================================

// One level-2 section, heading line included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Raw text after the "##" marker, closing hashes removed
    pub heading_text: String,
    /// Raw lines, starting with the heading line itself
    pub lines: Vec<String>,
    /// Zero-based line index of the heading
    pub start_line: usize,
    /// Zero-based line index of the last line that belongs to the section
    pub end_line: usize,
}

impl Section {
    // Renders the section as a standalone file: its heading becomes level 1,
    // every other line (nested headings included) is left untouched, and
    // trailing blank lines are dropped.
    pub fn standalone_content(&self) -> String {
        let mut lines: Vec<&str> = self.lines.iter().map(String::as_str).collect();
        while lines.len() > 1 && lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let mut content = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                content.push_str(&with_heading_level(line, 1));
            } else {
                content.push_str(line);
            }
            content.push('\n');
        }
        content
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitDocument {
    /// Text of the first level-1 heading, if any
    pub title: Option<String>,
    /// Lines before the first section, level-1 headings excluded
    pub preamble: Vec<String>,
    pub sections: Vec<Section>,
    /// Lines that followed a second level-1 heading and belong nowhere
    pub dropped_lines: usize,
}

impl SplitDocument {
    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }
}

// Partitions raw lines into title, preamble and sections
pub fn split_sections(lines: &[&str]) -> SplitDocument {
    let mut document = SplitDocument::default();
    let mut current: Option<Section> = None;
    let mut seen_section = false;
    let mut fence = FenceTracker::default();

    for (index, line) in lines.iter().enumerate() {
        let heading = if fence.is_open() {
            None
        } else {
            parse_atx_heading(line)
        };
        fence.observe(line);

        match heading {
            Some((1, text)) => {
                if let Some(mut section) = current.take() {
                    section.end_line = index.saturating_sub(1);
                    document.sections.push(section);
                }
                if document.title.is_none() {
                    document.title = Some(text);
                }
            }
            Some((2, text)) => {
                if let Some(mut section) = current.take() {
                    section.end_line = index.saturating_sub(1);
                    document.sections.push(section);
                }
                seen_section = true;
                current = Some(Section {
                    heading_text: text,
                    lines: vec![line.to_string()],
                    start_line: index,
                    end_line: index,
                });
            }
            _ => match current.as_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None if !seen_section => document.preamble.push(line.to_string()),
                None => document.dropped_lines += 1,
            },
        }
    }

    if let Some(mut section) = current.take() {
        section.end_line = lines.len().saturating_sub(1);
        document.sections.push(section);
    }

    document
}

// Parses an ATX heading line into (level, text)
//
// Up to three leading spaces are allowed, then 1-6 '#' followed by
// whitespace or end of line. The optional closing run of '#' is removed.
pub(crate) fn parse_atx_heading(line: &str) -> Option<(usize, String)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];

    let level = rest.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let after = &rest[level..];
    if !(after.is_empty() || after.starts_with(' ') || after.starts_with('\t')) {
        return None;
    }

    let mut text = after.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.is_empty() || without_closing.ends_with(' ') || without_closing.ends_with('\t') {
        text = without_closing.trim_end();
    }

    Some((level, text.to_string()))
}

// Rewrites an ATX heading line to the given level, keeping everything after
// the hashes verbatim. Non-heading lines are returned unchanged.
pub(crate) fn with_heading_level(line: &str, level: usize) -> String {
    if parse_atx_heading(line).is_none() {
        return line.to_string();
    }
    let body = line.trim_start_matches(' ').trim_start_matches('#');
    format!("{}{}", "#".repeat(level), body)
}

// Tracks whether we are inside a fenced code block
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    // Fence character and length of the opening fence
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub(crate) fn observe(&mut self, line: &str) {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return;
        }

        let Some(marker) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') else {
            return;
        };
        let run = trimmed.chars().take_while(|&c| c == marker).count();
        if run < 3 {
            return;
        }

        match self.open {
            None => self.open = Some((marker, run)),
            Some((open_marker, open_run)) => {
                let only_fence = trimmed[run..].trim().is_empty();
                if marker == open_marker && run >= open_run && only_fence {
                    self.open = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_split_title_and_sections() {
        let text = "# Title\n\nIntro\n\n## A\n\nalpha\n\n### A.1\n\nnested\n\n## B\n\nbeta\n";
        let document = split_sections(&lines(text));

        assert_eq!(document.title.as_deref(), Some("Title"));
        assert_eq!(document.preamble, vec!["", "Intro", ""]);
        assert_eq!(document.sections.len(), 2);

        let a = &document.sections[0];
        assert_eq!(a.heading_text, "A");
        assert_eq!(a.start_line, 4);
        assert_eq!(a.end_line, 11);
        assert!(a.lines.contains(&"### A.1".to_string()));

        let b = &document.sections[1];
        assert_eq!(b.heading_text, "B");
        assert_eq!(b.start_line, 12);
        assert_eq!(b.end_line, 14);
    }

    #[test]
    fn test_title_only_document_has_no_sections() {
        let document = split_sections(&lines("# Only a title\n\nSome text.\n"));
        assert!(!document.has_sections());
        assert_eq!(document.title.as_deref(), Some("Only a title"));
    }

    #[test]
    fn test_second_level_one_heading_closes_section() {
        let text = "# T\n## A\na\n# Appendix\nlost\n## B\nb";
        let document = split_sections(&lines(text));

        assert_eq!(document.sections.len(), 2);
        assert_eq!(document.sections[0].lines, vec!["## A", "a"]);
        assert_eq!(document.sections[0].end_line, 2);
        assert_eq!(document.sections[1].lines, vec!["## B", "b"]);
        assert_eq!(document.dropped_lines, 1);
        assert_eq!(document.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_code_fences_hide_headings() {
        let text = "# T\n## Shell\n```sh\n# comment\n## also comment\n```\nafter";
        let document = split_sections(&lines(text));

        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.sections[0].lines.len(), 6);
    }

    #[test]
    fn test_parse_atx_heading() {
        assert_eq!(parse_atx_heading("## Setup"), Some((2, "Setup".to_string())));
        assert_eq!(parse_atx_heading("## Setup ##"), Some((2, "Setup".to_string())));
        assert_eq!(parse_atx_heading("   # Indented"), Some((1, "Indented".to_string())));
        assert_eq!(parse_atx_heading("## C#"), Some((2, "C#".to_string())));
        assert_eq!(parse_atx_heading("#hashtag"), None);
        assert_eq!(parse_atx_heading("    # code"), None);
        assert_eq!(parse_atx_heading("####### seven"), None);
    }

    #[test]
    fn test_standalone_content_lifts_only_first_heading() {
        let section = Section {
            heading_text: "A".to_string(),
            lines: vec!["## A", "", "### A.1", "text", "", ""]
                .into_iter()
                .map(String::from)
                .collect(),
            start_line: 0,
            end_line: 5,
        };
        assert_eq!(section.standalone_content(), "# A\n\n### A.1\ntext\n");
    }

    #[test]
    fn test_with_heading_level() {
        assert_eq!(with_heading_level("## **Bold**", 1), "# **Bold**");
        assert_eq!(with_heading_level("# Up", 2), "## Up");
        assert_eq!(with_heading_level("plain", 2), "plain");
    }
}
