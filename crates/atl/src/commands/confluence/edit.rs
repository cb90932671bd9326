//! Page create and update commands.

use atl_confluence::UpdateOptions;
use clap::Args;

use super::read::fetcher;
use crate::GlobalArgs;
use crate::commands::BodyArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Space key.
    space_key: String,

    /// Page title.
    title: String,

    #[command(flatten)]
    content: BodyArgs,

    /// Create the page under this parent page ID.
    #[arg(long)]
    parent: Option<String>,

    /// Treat the body as storage XHTML instead of markdown.
    #[arg(long)]
    storage: bool,
}

impl CreateArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let fetcher = fetcher(global)?;
        let body = self.content.read()?;

        let page = fetcher.create_page(
            &self.space_key,
            &self.title,
            &body,
            self.parent.as_deref(),
            !self.storage,
        )?;

        output.success(&format!("Created page {} '{}'", page.id, page.title));
        if let Some(url) = &page.url {
            output.info(&format!("  {url}"));
        }
        output.json(&page)
    }
}

/// Arguments for the update command.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Page ID.
    page_id: String,

    /// New page title.
    title: String,

    #[command(flatten)]
    content: BodyArgs,

    /// Mark the change as a minor edit.
    #[arg(long)]
    minor_edit: bool,

    /// Version comment.
    #[arg(short, long, default_value = "")]
    message: String,

    /// Move the page under this parent page ID.
    #[arg(long)]
    parent: Option<String>,

    /// Treat the body as storage XHTML instead of markdown.
    #[arg(long)]
    storage: bool,
}

impl UpdateArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let fetcher = fetcher(global)?;
        let body = self.content.read()?;

        let page = fetcher.update_page(
            &self.page_id,
            &self.title,
            &body,
            &UpdateOptions {
                minor_edit: self.minor_edit,
                version_comment: &self.message,
                is_markdown: !self.storage,
                parent_id: self.parent.as_deref(),
            },
        )?;

        match page.version {
            Some(version) => output.success(&format!("Updated page {} to version {version}", page.id)),
            None => output.warning(&format!("Updated page {} (version unknown)", page.id)),
        }
        output.json(&page)
    }
}
