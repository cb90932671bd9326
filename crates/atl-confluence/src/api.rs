//! Seam between page operations and the Confluence REST API.

use atl_client::ApiError;

use crate::types::{Listing, RawPage, RawSpace};

/// Page to create.
#[derive(Debug, Clone, Copy)]
pub struct NewPage<'a> {
    pub space_key: &'a str,
    pub title: &'a str,
    /// Storage-format body.
    pub body: &'a str,
    pub parent_id: Option<&'a str>,
}

/// Replacement content for an existing page.
#[derive(Debug, Clone, Copy)]
pub struct PageUpdate<'a> {
    pub page_id: &'a str,
    pub title: &'a str,
    /// Storage-format body.
    pub body: &'a str,
    /// Number of the version being created.
    pub version: u32,
    pub minor_edit: bool,
    /// Version comment; empty for none.
    pub message: &'a str,
    /// New parent page, to move the page.
    pub parent_id: Option<&'a str>,
}

/// Confluence operations the page service needs.
///
/// [`ConfluenceClient`](crate::ConfluenceClient) talks to a live instance;
/// `MockConfluenceApi` serves canned pages in tests.
pub trait ConfluenceApi {
    /// Base URL of the instance, without trailing slash.
    fn base_url(&self) -> &str;

    /// Fetch a page with the given comma-separated expansions.
    fn get_page_by_id(&self, page_id: &str, expand: &str) -> Result<RawPage, ApiError>;

    /// Find a page by exact title within a space.
    fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &str,
    ) -> Result<Option<RawPage>, ApiError>;

    /// Ancestors of a page, root first.
    fn get_page_ancestors(&self, page_id: &str) -> Result<Vec<RawPage>, ApiError>;

    /// One page of the space listing.
    fn get_all_spaces(&self, start: u32, limit: u32) -> Result<Listing<RawSpace>, ApiError>;

    /// One page of the pages in a space.
    fn get_all_pages_from_space(
        &self,
        space_key: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Vec<RawPage>, ApiError>;

    /// Direct child pages of a page.
    fn get_page_children(
        &self,
        page_id: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Listing<RawPage>, ApiError>;

    /// Create a page and return the API's representation of it.
    fn create_page(&self, page: &NewPage<'_>) -> Result<RawPage, ApiError>;

    /// Replace a page's title and body with a new version.
    fn update_page(&self, update: &PageUpdate<'_>) -> Result<RawPage, ApiError>;
}
