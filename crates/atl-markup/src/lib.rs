//! Text conversion between Markdown, Confluence storage format and Jira wiki markup.
//!
//! The services in `atl-confluence` and `atl-jira` depend on the
//! [`TextPreprocessor`] trait; [`Preprocessor`] is the default
//! implementation built on pulldown-cmark and quick-xml.
//!
//! # Example
//!
//! ```
//! use atl_markup::{Preprocessor, TextPreprocessor};
//!
//! let preprocessor = Preprocessor::new();
//! assert_eq!(preprocessor.markdown_to_jira("**done**").unwrap(), "*done*");
//! assert_eq!(
//!     preprocessor.markdown_to_confluence_storage("# Notes"),
//!     "<h1>Notes</h1>"
//! );
//! ```

mod entities;
mod error;
mod jira;
mod markdown;
mod preprocessor;
mod storage;
mod tree;

pub use error::MarkupError;
pub use preprocessor::{Preprocessor, ProcessedContent, TextPreprocessor};
