// src/slug.rs
// =============================================================================
// Turns heading text into a slug that is safe both as a file name and as an
// in-page anchor. Section files and the anchors in index.md use the exact
// same rule, so a link like ./setup.md#install always lines up.
//
// The rule:
//   1. lowercase
//   2. drop every character outside [a-z0-9 -] (so "/" and "." vanish)
//   3. each run of whitespace becomes one hyphen
//   4. each run of hyphens becomes one hyphen
//   5. trim hyphens from both ends
// =============================================================================

use std::collections::HashSet;

// File name used when a heading slugs to nothing (e.g. "???" or "日本語")
const EMPTY_SLUG_FALLBACK: &str = "section";

// Sanitizes heading text into a slug
//
// Examples:
//   "API Reference / Overview" -> "api-reference-overview"
//   "---Test---"               -> "test"
//   "A.1"                      -> "a1"
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.chars() {
        let is_separator = ch.is_whitespace() || ch == '-';
        let is_kept = ch.is_ascii_lowercase() || ch.is_ascii_digit();

        if is_separator {
            pending_hyphen = true;
        } else if is_kept {
            // Hyphens are only emitted between kept characters, which
            // takes care of both collapsing and trimming
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        }
        // Anything else is stripped without affecting separators
    }

    slug
}

// Builds the "<slug>.md" file name for a heading
pub fn section_filename(heading_text: &str) -> String {
    let slug = slugify(heading_text);
    if slug.is_empty() {
        format!("{}.md", EMPTY_SLUG_FALLBACK)
    } else {
        format!("{}.md", slug)
    }
}

// Hands out unique file names within one explode run.
//
// The first heading to claim a name keeps it; later ones get "-2", "-3", ...
// A suffixed name is itself reserved, so "Setup", "Setup", "Setup 2" gives
// setup.md, setup-2.md, setup-2-2.md instead of overwriting anything.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    taken: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    // Marks a name as unavailable without assigning it to a heading
    pub fn reserve(&mut self, filename: &str) {
        self.taken.insert(filename.to_string());
    }

    // Returns (file name, collided) for the heading
    pub fn allocate(&mut self, heading_text: &str) -> (String, bool) {
        let base = section_filename(heading_text);
        if self.taken.insert(base.clone()) {
            return (base, false);
        }

        let stem = base.trim_end_matches(".md");
        let mut counter = 2;
        loop {
            let candidate = format!("{}-{}.md", stem, counter);
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("API Reference / Overview"), "api-reference-overview");
        assert_eq!(slugify("---Test---"), "test");
        assert_eq!(slugify("A.1"), "a1");
        assert_eq!(slugify("Getting   Started"), "getting-started");
    }

    #[test]
    fn test_slugify_strips_punctuation_and_formatting() {
        assert_eq!(slugify("**Bold** `code` thing!"), "bold-code-thing");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_slugify_is_deterministic() {
        let text = "Installation & Setup (v2)";
        assert_eq!(slugify(text), slugify(text));
        assert_eq!(slugify(text), "installation-setup-v2");
    }

    #[test]
    fn test_empty_slug_falls_back() {
        assert_eq!(slugify("???"), "");
        assert_eq!(section_filename("???"), "section.md");
    }

    #[test]
    fn test_allocator_disambiguates_collisions() {
        let mut names = FilenameAllocator::new();
        assert_eq!(names.allocate("Setup"), ("setup.md".to_string(), false));
        assert_eq!(names.allocate("setup!"), ("setup-2.md".to_string(), true));
        assert_eq!(names.allocate("Setup 2"), ("setup-2-2.md".to_string(), true));
        assert_eq!(names.allocate("Other"), ("other.md".to_string(), false));
    }

    #[test]
    fn test_reserved_names_are_skipped() {
        let mut names = FilenameAllocator::new();
        names.reserve("index.md");
        assert_eq!(names.allocate("Index"), ("index-2.md".to_string(), true));
    }
}
