//! Confluence subcommands.

mod edit;
mod read;

use clap::Subcommand;

use crate::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Confluence page commands.
#[derive(Subcommand)]
pub(crate) enum ConfluenceCommand {
    /// Fetch a page by ID.
    Page(read::PageArgs),
    /// List the ancestors of a page, immediate parent first.
    Ancestors(read::AncestorsArgs),
    /// List the child pages of a page.
    Children(read::ChildrenArgs),
    /// List pages in a space.
    SpacePages(read::SpacePagesArgs),
    /// Find a page by exact title within a space.
    Find(read::FindArgs),
    /// Create a page from markdown or storage content.
    Create(edit::CreateArgs),
    /// Replace the title and body of a page.
    Update(edit::UpdateArgs),
}

impl ConfluenceCommand {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Page(args) => args.execute(global, output),
            Self::Ancestors(args) => args.execute(global, output),
            Self::Children(args) => args.execute(global, output),
            Self::SpacePages(args) => args.execute(global, output),
            Self::Find(args) => args.execute(global, output),
            Self::Create(args) => args.execute(global, output),
            Self::Update(args) => args.execute(global, output),
        }
    }
}
