//! Space operations for Confluence API.

use atl_client::ApiError;

use super::ConfluenceClient;
use crate::types::{Listing, RawSpace};

impl ConfluenceClient {
    /// One page of the global space listing.
    pub(crate) fn list_spaces(&self, start: u32, limit: u32) -> Result<Listing<RawSpace>, ApiError> {
        let url = self.api_url(
            "space",
            &[("start", &start.to_string()), ("limit", &limit.to_string())],
        );
        self.rest.get(&url)
    }
}
