// src/markdown/headings.rs
// =============================================================================
// Enumerates the headings of a Markdown document.
//
// pulldown-cmark reports a heading as Start(Heading) ... End(Heading) with
// the heading's inline content in between, so we gather the text events
// that arrive while a heading is open. Inline formatting is dropped:
// "## **Bold** move" yields the text "Bold move".
//
// Each heading also records the source line it starts on, which is how the
// index pairs a parsed heading with the raw section the splitter cut there.
// =============================================================================

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};

use super::parser_options;

// One heading in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// 1 through 6
    pub level: u8,
    pub text: String,
    /// Position among the document's headings, starting at 0
    pub ordinal_index: usize,
    /// Zero-based source line the heading starts on
    pub line: usize,
}

// Extracts every heading (ATX and setext) from Markdown text
//
// Headings inside fenced code blocks are not headings and never appear.
pub fn extract_headings(markdown: &str) -> Vec<HeadingRef> {
    let mut headings = Vec::new();

    // Byte offset of every '\n', to turn event offsets into line numbers
    let newlines: Vec<usize> = markdown.match_indices('\n').map(|(at, _)| at).collect();

    // (level, start line, accumulated text) while inside a heading
    let mut current: Option<(u8, usize, String)> = None;

    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading(level, _id, _classes)) => {
                let line = newlines.partition_point(|&at| at < range.start);
                current = Some((level_number(level), line, String::new()));
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, line, text)) = current.take() {
                    headings.push(HeadingRef {
                        level,
                        text: text.trim().to_string(),
                        ordinal_index: headings.len(),
                        line,
                    });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, buffer)) = current.as_mut() {
                    buffer.push(' ');
                }
            }
            _ => {}
        }
    }

    headings
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
