// src/checker/classify.rs
// =============================================================================
// Decides what kind of link a raw URL string is, and turns it into a verdict.
//
// Classification order (first match wins):
// 1. "" or "#..."          -> ignored, not reported at all
// 2. "mailto:..."          -> skipped (email)
// 3. bare user@host.tld    -> skipped (email)
// 4. http:// or https://   -> fetched; ok on a success status
// 5. other scheme (tel:, ftp:, data:, ...) -> skipped (unsupported scheme)
//    file:// URLs fall through to the local check
// 6. anything else         -> a path relative to the referring document;
//                             ok if it exists on disk
//
// Nothing here holds state, so any number of checks can run at once.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::http::check_remote;

// local-part@domain.tld, with at least one dot in the domain
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
        .expect("email pattern is valid")
});

// What kind of target a URL points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// In-page anchor or empty target
    Fragment,
    Email,
    Remote,
    UnsupportedScheme(String),
    /// Resolved filesystem path (anchor and query removed)
    Local(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrokenReason {
    /// Timeout, DNS failure, refused connection, TLS error...
    Unreachable,
    /// The server answered with a non-success status
    StatusCode(u16),
    FileNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Email,
    UnsupportedScheme(String),
}

// The outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum LinkVerdict {
    Ok,
    Broken(BrokenReason),
    Skipped(SkipReason),
}

// Represents the result of checking a single link
#[derive(Debug, Clone, Serialize)]
pub struct LinkCheckResult {
    /// The URL exactly as written in the document
    pub url: String,
    #[serde(flatten)]
    pub verdict: LinkVerdict,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Filesystem path a local link resolved to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
}

impl LinkCheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.verdict, LinkVerdict::Ok)
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.verdict, LinkVerdict::Broken(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.verdict, LinkVerdict::Skipped(_))
    }
}

// Classifies a URL found in a document that lives in `source_dir`
pub fn classify(url: &str, source_dir: &Path) -> LinkKind {
    let url = url.trim();

    if url.is_empty() || url.starts_with('#') {
        return LinkKind::Fragment;
    }

    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("mailto:") || EMAIL.is_match(url) {
        return LinkKind::Email;
    }
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return LinkKind::Remote;
    }

    // A one-letter "scheme" is a Windows drive letter, not a URL
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        if scheme == "file" {
            if let Ok(path) = parsed.to_file_path() {
                return LinkKind::Local(path);
            }
        } else if scheme.len() > 1 {
            return LinkKind::UnsupportedScheme(scheme.to_string());
        }
    }

    LinkKind::Local(resolve_local(url, source_dir))
}

// "./docs/My%20File.md?raw#intro" -> <source_dir>/docs/My File.md
fn resolve_local(url: &str, source_dir: &Path) -> PathBuf {
    let path = url.split(|c| c == '#' || c == '?').next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    source_dir.join(decoded.as_ref())
}

// Classifies and checks one URL
//
// Returns None for fragments, which are not reported at all.
pub async fn check_link(client: &Client, url: &str, source_dir: &Path) -> Option<LinkCheckResult> {
    let (verdict, message, target) = match classify(url, source_dir) {
        LinkKind::Fragment => return None,
        LinkKind::Email => (LinkVerdict::Skipped(SkipReason::Email), None, None),
        LinkKind::UnsupportedScheme(scheme) => {
            let message = format!("{}: links are not checked", scheme);
            (
                LinkVerdict::Skipped(SkipReason::UnsupportedScheme(scheme)),
                Some(message),
                None,
            )
        }
        LinkKind::Remote => {
            let (verdict, message) = check_remote(client, url).await;
            (verdict, Some(message), None)
        }
        LinkKind::Local(path) => {
            if tokio::fs::metadata(&path).await.is_ok() {
                (LinkVerdict::Ok, None, Some(path))
            } else {
                let message = format!("No such file: {}", path.display());
                (
                    LinkVerdict::Broken(BrokenReason::FileNotFound),
                    Some(message),
                    Some(path),
                )
            }
        }
    };

    Some(LinkCheckResult {
        url: url.to_string(),
        verdict,
        message,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_categories() {
        let dir = Path::new("/docs");
        assert_eq!(classify("#section", dir), LinkKind::Fragment);
        assert_eq!(classify("", dir), LinkKind::Fragment);
        assert_eq!(classify("mailto:x@y.com", dir), LinkKind::Email);
        assert_eq!(classify("user@example.com", dir), LinkKind::Email);
        assert_eq!(classify("https://example.com/a", dir), LinkKind::Remote);
        assert_eq!(classify("HTTP://EXAMPLE.COM", dir), LinkKind::Remote);
        assert_eq!(
            classify("tel:+123456", dir),
            LinkKind::UnsupportedScheme("tel".to_string())
        );
        assert_eq!(
            classify("./guide.md#install", dir),
            LinkKind::Local(PathBuf::from("/docs/./guide.md"))
        );
    }

    #[test]
    fn test_email_needs_a_dotted_domain() {
        let dir = Path::new("/docs");
        assert_eq!(
            classify("user@localhost", dir),
            LinkKind::Local(PathBuf::from("/docs/user@localhost"))
        );
    }

    #[test]
    fn test_local_paths_are_decoded() {
        let dir = Path::new("/docs");
        assert_eq!(
            classify("My%20Notes.md?plain=1", dir),
            LinkKind::Local(PathBuf::from("/docs/My Notes.md"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_urls_are_local() {
        assert_eq!(
            classify("file:///tmp/notes.md", Path::new("/docs")),
            LinkKind::Local(PathBuf::from("/tmp/notes.md"))
        );
    }

    #[tokio::test]
    async fn test_check_local_links() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("existing.md"), "# Here\n").unwrap();
        let client = Client::new();

        let ok = check_link(&client, "./existing.md", tmp.path()).await.unwrap();
        assert_eq!(ok.verdict, LinkVerdict::Ok);
        assert!(ok.is_ok());

        let anchored = check_link(&client, "./existing.md#here", tmp.path()).await.unwrap();
        assert!(anchored.is_ok());

        let missing = check_link(&client, "./missing.md", tmp.path()).await.unwrap();
        assert_eq!(missing.verdict, LinkVerdict::Broken(BrokenReason::FileNotFound));
        assert!(missing.is_broken());
    }

    #[tokio::test]
    async fn test_check_skips_and_ignores() {
        let client = Client::new();
        let dir = Path::new("/docs");

        assert!(check_link(&client, "#section", dir).await.is_none());

        let email = check_link(&client, "user@example.com", dir).await.unwrap();
        assert_eq!(email.verdict, LinkVerdict::Skipped(SkipReason::Email));

        let mailto = check_link(&client, "mailto:x@y.com", dir).await.unwrap();
        assert_eq!(mailto.verdict, LinkVerdict::Skipped(SkipReason::Email));
        assert!(mailto.is_skipped());
    }

    #[test]
    fn test_verdict_json_shape() {
        let result = LinkCheckResult {
            url: "./missing.md".to_string(),
            verdict: LinkVerdict::Broken(BrokenReason::FileNotFound),
            message: None,
            target: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "broken");
        assert_eq!(json["reason"], "file-not-found");
    }
}
