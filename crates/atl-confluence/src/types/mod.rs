//! Confluence REST API response types.
//!
//! Every field defaults when absent so partial expansions deserialize.

mod page;
mod space;

pub use page::{RawAttachment, RawBody, RawChildren, RawLinks, RawPage, RawStorage, RawUser, RawVersion};
pub use space::RawSpace;

use serde::{Deserialize, Serialize};

/// List response that is either wrapped in a `results` envelope or bare.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Paginated envelope (`{"results": [...], "start": 0, ...}`).
    Envelope {
        /// Items on this page.
        results: Vec<T>,
    },
    /// Plain JSON array.
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    /// Items regardless of the response shape.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Envelope { results } | Self::Bare(results) => results,
        }
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::Bare(Vec::new())
    }
}
