//! Confluence page types.

use serde::{Deserialize, Serialize};

use super::{Listing, RawSpace};

/// Page as returned by the content API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPage {
    /// Page ID.
    pub id: String,
    /// Content type (`page`).
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: String,
    /// Present when `space` is expanded.
    pub space: Option<RawSpace>,
    /// Present when `version` is expanded.
    pub version: Option<RawVersion>,
    /// Present when `body.storage` is expanded.
    pub body: Option<RawBody>,
    /// Root first, when `ancestors` is expanded.
    pub ancestors: Vec<RawPage>,
    pub children: Option<RawChildren>,
    /// Hypermedia links.
    #[serde(rename = "_links")]
    pub links: Option<RawLinks>,
}

impl RawPage {
    /// Storage-format body, if expanded.
    #[must_use]
    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.storage.as_ref())
            .map(|storage| storage.value.as_str())
    }

    /// Key of the containing space, if expanded.
    #[must_use]
    pub fn space_key(&self) -> Option<&str> {
        self.space.as_ref().map(|space| space.key.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawVersion {
    pub number: u32,
    /// ISO 8601 timestamp of this version.
    pub when: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "minorEdit")]
    pub minor_edit: bool,
    /// Author of this version.
    pub by: Option<RawUser>,
}

/// Confluence user reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawUser {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawBody {
    /// Storage format content.
    pub storage: Option<RawStorage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawStorage {
    /// XHTML in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Expanded children of a page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawChildren {
    /// Present when `children.page` is expanded.
    pub page: Option<Listing<RawPage>>,
    /// Present when `children.attachment` is expanded.
    pub attachment: Option<Listing<RawAttachment>>,
}

/// Attachment reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawAttachment {
    pub id: String,
    /// Attachment filename.
    pub title: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawLinks {
    /// Web UI path relative to the base URL.
    pub webui: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_expanded_page() {
        let page: RawPage = serde_json::from_str(
            r#"{
                "id": "123",
                "type": "page",
                "title": "Runbook",
                "space": {"key": "OPS", "name": "Operations"},
                "version": {"number": 4, "when": "2024-03-01T09:00:00.000Z", "by": {"displayName": "Ada"}},
                "body": {"storage": {"value": "<p>Hi</p>", "representation": "storage"}},
                "children": {"attachment": {"results": [{"id": "att1", "title": "diagram.png"}], "size": 1}},
                "_links": {"webui": "/spaces/OPS/pages/123/Runbook"}
            }"#,
        )
        .unwrap();

        assert_eq!(page.storage_value(), Some("<p>Hi</p>"));
        assert_eq!(page.space_key(), Some("OPS"));
        assert_eq!(page.version.as_ref().map(|v| v.number), Some(4));
        let attachments = page.children.unwrap().attachment.unwrap().into_vec();
        assert_eq!(attachments[0].title, "diagram.png");
    }

    #[test]
    fn test_deserialize_minimal_page() {
        let page: RawPage = serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();
        assert_eq!(page.storage_value(), None);
        assert_eq!(page.space_key(), None);
        assert!(page.ancestors.is_empty());
    }
}
