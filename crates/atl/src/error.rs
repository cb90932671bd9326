//! CLI error types.

use atl_client::ApiError;
use atl_config::ConfigError;
use atl_confluence::ConfluenceError;
use atl_jira::JiraError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Jira(#[from] JiraError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
