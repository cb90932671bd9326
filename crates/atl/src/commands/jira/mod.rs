//! Jira subcommands.

mod comments;
mod worklogs;

use atl_jira::{JiraClient, JiraFetcher};
use atl_markup::Preprocessor;
use clap::Subcommand;

use crate::GlobalArgs;
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::Output;

/// Jira comment and worklog commands.
#[derive(Subcommand)]
pub(crate) enum JiraCommand {
    /// List the comments of an issue as markdown.
    Comments(comments::CommentsArgs),
    /// Add a markdown comment to an issue.
    Comment(comments::CommentArgs),
    /// List the worklogs of an issue.
    Worklogs(worklogs::WorklogsArgs),
    /// Log work on an issue.
    Worklog(worklogs::WorklogArgs),
}

impl JiraCommand {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Comments(args) => args.execute(global, output),
            Self::Comment(args) => args.execute(global, output),
            Self::Worklogs(args) => args.execute(global, output),
            Self::Worklog(args) => args.execute(global, output),
        }
    }
}

fn fetcher(
    global: &GlobalArgs,
    force_internal_comments: Option<bool>,
) -> Result<JiraFetcher<JiraClient, Preprocessor>, CliError> {
    let config = load_config(global, force_internal_comments)?;
    Ok(JiraFetcher::from_config(config.require_jira()?)?)
}
