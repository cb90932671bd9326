//! Confluence page operations for atl.
//!
//! This crate maps Confluence REST responses into normalized [`Page`]
//! records. It provides:
//!
//! - [`ConfluenceApi`] trait, the seam between page operations and HTTP
//! - [`ConfluenceClient`] implementation talking to a live instance
//! - [`ConfluenceFetcher`] with the page operations (fetch, find by title,
//!   list a space, ancestors, children, create, update)
//! - `MockConfluenceApi` for testing (behind `mock` feature flag)
//!
//! Page bodies go through an [`atl_markup::TextPreprocessor`], so callers
//! get Markdown or processed storage HTML and may write Markdown back.
//!
//! # Example
//!
//! ```ignore
//! use atl_config::Config;
//! use atl_confluence::ConfluenceFetcher;
//!
//! let config = Config::load(None, None)?;
//! let fetcher = ConfluenceFetcher::from_config(config.require_confluence()?)?;
//! let page = fetcher.get_page_content("123456", true)?;
//! println!("{}\n\n{}", page.title, page.content);
//! ```

mod api;
mod client;
mod error;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod pages;
pub mod types;

pub use api::{ConfluenceApi, NewPage, PageUpdate};
pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use fetcher::ConfluenceFetcher;
#[cfg(any(test, feature = "mock"))]
pub use mock::{CreatedPage, MockConfluenceApi, UpdatedPage};
pub use models::{ContentFormat, Page, PageRef, SpaceRef};
pub use pages::{
    DEFAULT_CHILDREN_EXPAND, DEFAULT_CHILDREN_LIMIT, DEFAULT_SPACE_PAGES_LIMIT, UpdateOptions,
};
