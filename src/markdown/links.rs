// src/markdown/links.rs
// =============================================================================
// This module extracts link targets from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Resolves reference-style links ([text][ref]) against their definitions
// - Keeps the reference definitions ([ref]: target) in a lookup table
//
// A reference link whose label has no definition is just text to
// pulldown-cmark, so it never shows up here. That is what we want.
//
// Raw HTML that slips into Markdown (<a href="...">) arrives as Html events.
// We collect those fragments and let `scraper` find the anchors.
//
// Nothing is filtered or deduplicated here: fragments, mailto: links and
// repeats are all returned. Deciding what to check is the checker's job.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};

use super::parser_options;

// Where in the document a URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// Inline, reference-style or autolink
    Link,
    /// A reference definition line ([label]: url)
    Definition,
    /// An <a href> inside raw HTML
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLink {
    pub url: String,
    pub origin: LinkOrigin,
}

// Extracts every link-like target from Markdown text
//
// Order: links as they appear, then reference definitions as they appear,
// then HTML anchors.
//
// Example input:
//   "See [docs][d] and <https://example.com>\n\n[d]: ./docs.md"
//
// Example output (urls):
//   ["./docs.md", "https://example.com", "./docs.md"]
pub fn extract_links(markdown: &str) -> Vec<FoundLink> {
    let parser = Parser::new_ext(markdown, parser_options());

    // Definitions are collected during the first pass, before any events are
    // pulled. The table is a hash map, so sort by source position.
    let mut definitions: Vec<(usize, String)> = parser
        .reference_definitions()
        .iter()
        .map(|(_label, definition)| (definition.span.start, definition.dest.to_string()))
        .collect();
    definitions.sort_by_key(|(start, _)| *start);

    let mut links = Vec::new();
    let mut html = String::new();

    for event in parser {
        match event {
            // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                links.push(FoundLink {
                    url: dest_url.to_string(),
                    origin: LinkOrigin::Link,
                });
            }
            Event::Html(fragment) => {
                html.push_str(&fragment);
                html.push('\n');
            }
            _ => {}
        }
    }

    links.extend(definitions.into_iter().map(|(_, url)| FoundLink {
        url,
        origin: LinkOrigin::Definition,
    }));

    if !html.is_empty() {
        links.extend(extract_html_anchors(&html).into_iter().map(|url| FoundLink {
            url,
            origin: LinkOrigin::Html,
        }));
    }

    links
}

// Pulls href values out of <a> tags in an HTML fragment
//
// Unlike a web crawler we do not resolve these against a base URL: a
// relative href in a Markdown file is relative to that file, and the
// checker handles it the same way as a Markdown link.
fn extract_html_anchors(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    fragment
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(links: &[FoundLink]) -> Vec<&str> {
        links.iter().map(|link| link.url.as_str()).collect()
    }

    #[test]
    fn test_extract_simple_link() {
        let markdown = "Check out [Rust](https://www.rust-lang.org)!";
        let links = extract_links(markdown);
        assert_eq!(urls(&links), vec!["https://www.rust-lang.org"]);
        assert_eq!(links[0].origin, LinkOrigin::Link);
    }

    #[test]
    fn test_keeps_relative_mailto_and_fragment_links() {
        let markdown = "[a](./a.md) [m](mailto:x@y.com) [f](#top)";
        let links = extract_links(markdown);
        assert_eq!(urls(&links), vec!["./a.md", "mailto:x@y.com", "#top"]);
    }

    #[test]
    fn test_reference_links_and_definitions() {
        let markdown = "See [docs][d].\n\n[d]: ./docs.md\n[unused]: https://example.com\n";
        let links = extract_links(markdown);
        assert_eq!(
            urls(&links),
            vec!["./docs.md", "./docs.md", "https://example.com"]
        );
        assert_eq!(links[1].origin, LinkOrigin::Definition);
        assert_eq!(links[2].origin, LinkOrigin::Definition);
    }

    #[test]
    fn test_undefined_reference_is_not_a_link() {
        let links = extract_links("This [dangles][nowhere] on purpose.");
        assert!(links.is_empty());
    }

    #[test]
    fn test_footnotes_are_not_definitions() {
        let links = extract_links("Text[^1].\n\n[^1]: a note\n");
        assert!(links.is_empty());
    }

    #[test]
    fn test_autolinks() {
        let links = extract_links("<https://example.com> and <user@example.com>");
        assert_eq!(urls(&links), vec!["https://example.com", "user@example.com"]);
    }

    #[test]
    fn test_html_anchors() {
        let markdown = "<p>See <a href=\"./other.md\">other</a></p>\n";
        let links = extract_links(markdown);
        assert_eq!(urls(&links), vec!["./other.md"]);
        assert_eq!(links[0].origin, LinkOrigin::Html);
    }
}
