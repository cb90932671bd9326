//! Issue worklog commands.

use atl_jira::NewWorklog;
use clap::Args;

use super::fetcher;
use crate::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the worklogs command.
#[derive(Args)]
pub(crate) struct WorklogsArgs {
    /// Issue key (e.g. `PROJ-123`).
    issue_key: String,
}

impl WorklogsArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let worklogs = fetcher(global, None)?.get_worklogs(&self.issue_key)?;
        output.json(&worklogs)
    }
}

/// Arguments for the worklog command.
#[derive(Args)]
pub(crate) struct WorklogArgs {
    /// Issue key (e.g. `PROJ-123`).
    issue_key: String,

    /// Time spent, e.g. `1h 30m`, `2d`, `3600s`.
    #[arg(short, long)]
    time_spent: String,

    /// Markdown comment.
    #[arg(long)]
    comment: Option<String>,

    /// Start time, e.g. `2024-01-01T09:00:00.000+0000` (default: now).
    #[arg(long)]
    started: Option<String>,

    /// Set the issue's original estimate before logging.
    #[arg(long)]
    original_estimate: Option<String>,

    /// Set the issue's remaining estimate.
    #[arg(long)]
    remaining_estimate: Option<String>,
}

impl WorklogArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let fetcher = fetcher(global, None)?;

        let added = fetcher.add_worklog(
            &self.issue_key,
            &NewWorklog {
                time_spent: &self.time_spent,
                comment: self.comment.as_deref(),
                started: self.started.as_deref(),
                original_estimate: self.original_estimate.as_deref(),
                remaining_estimate: self.remaining_estimate.as_deref(),
            },
        )?;

        if self.original_estimate.is_some() && !added.original_estimate_updated {
            output.warning("Original estimate could not be updated");
        }
        output.success(&format!(
            "Logged {}s on {}",
            added.worklog.time_spent_seconds, self.issue_key
        ));
        output.json(&added)
    }
}
