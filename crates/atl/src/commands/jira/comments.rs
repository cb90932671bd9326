//! Issue comment commands.

use atl_jira::DEFAULT_COMMENT_LIMIT;
use clap::Args;

use super::fetcher;
use crate::GlobalArgs;
use crate::commands::BodyArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the comments command.
#[derive(Args)]
pub(crate) struct CommentsArgs {
    /// Issue key (e.g. `PROJ-123`).
    issue_key: String,

    /// Maximum number of comments to return.
    #[arg(long, default_value_t = DEFAULT_COMMENT_LIMIT)]
    limit: usize,
}

impl CommentsArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let comments = fetcher(global, None)?.get_issue_comments(&self.issue_key, self.limit)?;
        output.json(&comments)
    }
}

/// Arguments for the comment command.
#[derive(Args)]
pub(crate) struct CommentArgs {
    /// Issue key (e.g. `PROJ-123`).
    issue_key: String,

    /// Markdown comment text; use --file to read it instead.
    #[arg(conflicts_with_all = ["body", "file"])]
    text: Option<String>,

    #[command(flatten)]
    content: BodyArgs,

    /// Comment visibility: `public` or `internal`.
    #[arg(long)]
    visibility: Option<String>,

    /// Post every comment as internal regardless of --visibility.
    #[arg(long, env = "JIRA_FORCE_INTERNAL_COMMENTS")]
    force_internal_comments: bool,
}

impl CommentArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let force = self.force_internal_comments.then_some(true);
        let fetcher = fetcher(global, force)?;
        let text = match self.text {
            Some(text) => text,
            None => self.content.read()?,
        };

        let comment = fetcher.add_comment(&self.issue_key, &text, self.visibility.as_deref())?;

        output.success(&format!("Added comment {} to {}", comment.id, self.issue_key));
        output.json(&comment)
    }
}
