//! Page operations for Confluence API.

use atl_client::{ApiError, encode_component};
use serde_json::{Value, json};
use tracing::info;

use super::ConfluenceClient;
use crate::api::{ConfluenceApi, NewPage, PageUpdate};
use crate::types::{Listing, RawPage, RawSpace};

/// Payload for a new page.
fn create_payload(page: &NewPage<'_>) -> Value {
    let mut payload = json!({
        "type": "page",
        "title": page.title,
        "space": {"key": page.space_key},
        "body": {
            "storage": {"value": page.body, "representation": "storage"}
        }
    });
    if let Some(parent_id) = page.parent_id {
        payload["ancestors"] = json!([{"id": parent_id}]);
    }
    payload
}

/// Payload for a new version of an existing page.
fn update_payload(update: &PageUpdate<'_>) -> Value {
    let mut payload = json!({
        "id": update.page_id,
        "type": "page",
        "title": update.title,
        "body": {
            "storage": {"value": update.body, "representation": "storage"}
        },
        "version": {
            "number": update.version,
            "minorEdit": update.minor_edit,
            "message": update.message
        }
    });
    if let Some(parent_id) = update.parent_id {
        payload["ancestors"] = json!([{"id": parent_id}]);
    }
    payload
}

impl ConfluenceApi for ConfluenceClient {
    fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn get_page_by_id(&self, page_id: &str, expand: &str) -> Result<RawPage, ApiError> {
        let url = self.api_url(
            &format!("content/{}", encode_component(page_id)),
            &[("expand", expand)],
        );
        self.rest.get(&url)
    }

    fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &str,
    ) -> Result<Option<RawPage>, ApiError> {
        let url = self.api_url(
            "content",
            &[
                ("type", "page"),
                ("spaceKey", space_key),
                ("title", title),
                ("expand", expand),
            ],
        );
        let listing: Listing<RawPage> = self.rest.get(&url)?;
        Ok(listing.into_vec().into_iter().next())
    }

    fn get_page_ancestors(&self, page_id: &str) -> Result<Vec<RawPage>, ApiError> {
        let page = self.get_page_by_id(page_id, "ancestors")?;
        Ok(page.ancestors)
    }

    fn get_all_spaces(&self, start: u32, limit: u32) -> Result<Listing<RawSpace>, ApiError> {
        self.list_spaces(start, limit)
    }

    fn get_all_pages_from_space(
        &self,
        space_key: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Vec<RawPage>, ApiError> {
        let url = self.api_url(
            "content",
            &[
                ("spaceKey", space_key),
                ("type", "page"),
                ("status", "current"),
                ("start", &start.to_string()),
                ("limit", &limit.to_string()),
                ("expand", expand),
            ],
        );
        let listing: Listing<RawPage> = self.rest.get(&url)?;
        Ok(listing.into_vec())
    }

    fn get_page_children(
        &self,
        page_id: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Listing<RawPage>, ApiError> {
        let url = self.api_url(
            &format!("content/{}/child/page", encode_component(page_id)),
            &[
                ("start", &start.to_string()),
                ("limit", &limit.to_string()),
                ("expand", expand),
            ],
        );
        self.rest.get(&url)
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<RawPage, ApiError> {
        info!("Creating page '{}' in space {}", page.title, page.space_key);
        let url = self.api_url("content", &[]);
        self.rest.post(&url, &create_payload(page))
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<RawPage, ApiError> {
        info!(
            "Updating page {} to version {}",
            update.page_id, update.version
        );
        let url = self.api_url(&format!("content/{}", encode_component(update.page_id)), &[]);
        self.rest.put(&url, &update_payload(update))
    }
}
