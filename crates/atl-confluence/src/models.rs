//! Normalized page records returned by [`ConfluenceFetcher`](crate::ConfluenceFetcher).

use serde::Serialize;

use crate::types::RawPage;

/// Format of [`Page::content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    /// Storage-format XHTML.
    Storage,
}

impl ContentFormat {
    pub(crate) fn from_flag(convert_to_markdown: bool) -> Self {
        if convert_to_markdown {
            Self::Markdown
        } else {
            Self::Storage
        }
    }
}

/// Space a page belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceRef {
    pub key: String,
    pub name: String,
}

/// Lightweight reference to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub id: String,
    pub title: String,
}

/// Confluence page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<SpaceRef>,
    /// Body in [`Self::content_format`]; empty when the body was not fetched.
    pub content: String,
    pub content_format: ContentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Timestamp of the current version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Author of the current version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Immediate parent first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<PageRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PageRef>,
    /// Attachment filenames.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// How to build a [`Page`] from a [`RawPage`].
pub(crate) struct PageBuild<'a> {
    pub base_url: &'a str,
    pub is_cloud: bool,
    /// Replaces the raw storage body when set.
    pub content: Option<String>,
    pub content_format: ContentFormat,
}

impl Page {
    pub(crate) fn from_raw(raw: &RawPage, build: PageBuild<'_>) -> Self {
        let content = build
            .content
            .unwrap_or_else(|| raw.storage_value().unwrap_or_default().to_owned());
        let version = raw.version.as_ref();
        let children = raw.children.as_ref();

        Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
            space: raw.space.as_ref().map(|space| SpaceRef {
                key: space.key.clone(),
                name: space.name.clone(),
            }),
            content,
            content_format: build.content_format,
            version: version.map(|v| v.number),
            last_modified: version.and_then(|v| v.when.clone()),
            author: version
                .and_then(|v| v.by.as_ref())
                .and_then(|by| by.display_name.clone()),
            url: page_url(raw, build.base_url, build.is_cloud),
            // The API lists ancestors root first
            ancestors: raw.ancestors.iter().rev().map(PageRef::from_raw).collect(),
            children: children
                .and_then(|c| c.page.clone())
                .map(|listing| listing.into_vec().iter().map(PageRef::from_raw).collect())
                .unwrap_or_default(),
            attachments: children
                .and_then(|c| c.attachment.clone())
                .map(|listing| listing.into_vec().into_iter().map(|a| a.title).collect())
                .unwrap_or_default(),
        }
    }
}

impl PageRef {
    fn from_raw(raw: &RawPage) -> Self {
        Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
        }
    }
}

/// Web URL of a page.
///
/// Uses the `webui` link when the API provided one, otherwise builds the
/// Cloud or Server/Data Center URL from the page ID.
pub(crate) fn page_url(raw: &RawPage, base_url: &str, is_cloud: bool) -> Option<String> {
    if raw.id.is_empty() {
        return None;
    }
    if let Some(webui) = raw.links.as_ref().and_then(|links| links.webui.as_deref()) {
        return Some(format!("{base_url}{webui}"));
    }
    match raw.space_key() {
        Some(space_key) if is_cloud && !space_key.is_empty() => Some(format!(
            "{base_url}/spaces/{space_key}/pages/{}",
            raw.id
        )),
        _ => Some(format!("{base_url}/pages/viewpage.action?pageId={}", raw.id)),
    }
}
