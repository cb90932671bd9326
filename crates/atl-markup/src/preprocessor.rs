//! Text preprocessor used by the Confluence and Jira services.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::entities::convert_html_entities;
use crate::error::MarkupError;
use crate::jira::{jira_to_markdown, markdown_to_jira};
use crate::markdown::{LinkContext, storage_to_markdown};
use crate::storage::markdown_to_storage;

/// Storage HTML prepared for display, with its markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedContent {
    /// Storage HTML with user links rendered as `@user` and entities normalized.
    pub html: String,
    pub markdown: String,
}

/// Converts text between the formats the services exchange with the APIs.
///
/// Implementations must be usable from any thread; services hold them
/// behind a shared reference.
pub trait TextPreprocessor: Send + Sync {
    /// Prepare a storage-format page body for display.
    fn process_html_content(&self, html: &str, space_key: &str) -> ProcessedContent;

    /// Convert markdown to Confluence storage format.
    fn markdown_to_confluence_storage(&self, markdown: &str) -> String;

    /// Convert markdown to Jira wiki markup.
    fn markdown_to_jira(&self, markdown: &str) -> Result<String, MarkupError>;

    /// Convert Jira wiki markup to readable text.
    fn clean_jira_text(&self, text: &str) -> String;
}

/// Default preprocessor.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    base_url: Option<String>,
}

impl Preprocessor {
    /// Create a preprocessor without a Confluence base URL.
    ///
    /// Page links in converted content are rendered as plain text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve page links in converted content against `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_owned());
        self
    }
}

static USER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:link[^>]*>\s*<ri:user\s+([^>]*?)/?>(?:\s*</ri:user>)?.*?</ac:link>")
        .expect("invalid user link regex")
});

static USER_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ri:(username|account-id|userkey)="([^"]*)""#).expect("invalid user attribute regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("invalid tag regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("invalid blank line regex"));

impl TextPreprocessor for Preprocessor {
    fn process_html_content(&self, html: &str, space_key: &str) -> ProcessedContent {
        let processed = render_user_links(&convert_html_entities(html));
        let links = LinkContext {
            base_url: self.base_url.as_deref(),
            space_key,
        };

        let markdown = match storage_to_markdown(html, links) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!(error = %e, "Storage format could not be parsed, stripping tags");
                strip_tags(&processed)
            }
        };

        ProcessedContent {
            html: processed,
            markdown,
        }
    }

    fn markdown_to_confluence_storage(&self, markdown: &str) -> String {
        markdown_to_storage(markdown)
    }

    fn markdown_to_jira(&self, markdown: &str) -> Result<String, MarkupError> {
        Ok(markdown_to_jira(markdown))
    }

    fn clean_jira_text(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        jira_to_markdown(text)
    }
}

/// Replace `ac:link` user references with `@user`.
fn render_user_links(html: &str) -> String {
    USER_LINK
        .replace_all(html, |caps: &Captures| {
            let attrs = &caps[1];
            let mut best: Option<(usize, &str)> = None;
            for attr in USER_ATTR.captures_iter(attrs) {
                let rank = match attr.get(1).map(|m| m.as_str()) {
                    Some("username") => 0,
                    Some("account-id") => 1,
                    _ => 2,
                };
                if let Some(value) = attr.get(2).map(|m| m.as_str())
                    && best.is_none_or(|(best_rank, _)| rank < best_rank)
                {
                    best = Some((rank, value));
                }
            }
            format!("@{}", best.map_or("unknown", |(_, value)| value))
        })
        .into_owned()
}

/// Fallback conversion: drop tags, unescape the XML entities, squeeze blank lines.
fn strip_tags(html: &str) -> String {
    let text = html
        .replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("</p>", "\n\n")
        .replace("</li>", "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_owned()
}
