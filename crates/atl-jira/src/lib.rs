//! Jira comment and worklog operations for atl.
//!
//! This crate maps Jira REST responses into [`Comment`] and [`Worklog`]
//! records. It provides:
//!
//! - [`JiraApi`] trait, the seam between the operations and HTTP
//! - [`JiraClient`] implementation talking to a live instance
//! - [`JiraFetcher`] with comment and worklog operations
//! - [`parse_time_spent`] for free-form durations such as `1w 2d 3h 4m`
//! - [`resolve_visibility`] deciding between public and internal comments
//! - `MockJiraApi` for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use atl_config::Config;
//! use atl_jira::{DEFAULT_COMMENT_LIMIT, JiraFetcher};
//!
//! let config = Config::load(None, None)?;
//! let fetcher = JiraFetcher::from_config(config.require_jira()?)?;
//! for comment in fetcher.get_issue_comments("PROJ-123", DEFAULT_COMMENT_LIMIT)? {
//!     println!("{}: {}", comment.author, comment.body);
//! }
//! ```

mod api;
mod client;
mod comments;
mod dates;
mod duration;
mod error;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod visibility;
mod worklog;
pub mod types;

pub use api::JiraApi;
pub use client::JiraClient;
pub use comments::DEFAULT_COMMENT_LIMIT;
pub use dates::{JIRA_TIMESTAMP_FORMAT, parse_date};
pub use duration::{DEFAULT_TIME_SPENT_SECONDS, parse_time_spent};
pub use error::JiraError;
pub use fetcher::JiraFetcher;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_AUTHOR, MOCK_TIMESTAMP, MockJiraApi, MockRequest};
pub use models::{AddedWorklog, Comment, Worklog};
pub use visibility::{Visibility, resolve_visibility};
pub use worklog::NewWorklog;
