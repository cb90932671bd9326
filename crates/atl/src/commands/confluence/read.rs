//! Read-only page commands.

use atl_confluence::{
    ConfluenceClient, ConfluenceFetcher, DEFAULT_CHILDREN_EXPAND, DEFAULT_CHILDREN_LIMIT,
    DEFAULT_SPACE_PAGES_LIMIT,
};
use atl_markup::Preprocessor;
use clap::Args;

use crate::GlobalArgs;
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::Output;

type Fetcher = ConfluenceFetcher<ConfluenceClient, Preprocessor>;

pub(super) fn fetcher(global: &GlobalArgs) -> Result<Fetcher, CliError> {
    let config = load_config(global, None)?;
    Ok(ConfluenceFetcher::from_config(config.require_confluence()?)?)
}

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page ID.
    page_id: String,

    /// Return processed storage XHTML instead of markdown.
    #[arg(long)]
    storage: bool,
}

impl PageArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let page = fetcher(global)?.get_page_content(&self.page_id, !self.storage)?;
        output.json(&page)
    }
}

/// Arguments for the ancestors command.
#[derive(Args)]
pub(crate) struct AncestorsArgs {
    /// Page ID.
    page_id: String,
}

impl AncestorsArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let ancestors = fetcher(global)?.get_page_ancestors(&self.page_id)?;
        output.json(&ancestors)
    }
}

/// Arguments for the children command.
#[derive(Args)]
pub(crate) struct ChildrenArgs {
    /// Parent page ID.
    page_id: String,

    /// Index of the first child to return.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Maximum number of children to return.
    #[arg(long, default_value_t = DEFAULT_CHILDREN_LIMIT)]
    limit: u32,

    /// Fields to expand on each child.
    #[arg(long, default_value = DEFAULT_CHILDREN_EXPAND)]
    expand: String,

    /// Convert child bodies to markdown (requires `body.storage` in --expand).
    #[arg(long)]
    markdown: bool,
}

impl ChildrenArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let children = fetcher(global)?.get_page_children(
            &self.page_id,
            self.start,
            self.limit,
            &self.expand,
            self.markdown,
        );
        output.json(&children)
    }
}

/// Arguments for the space-pages command.
#[derive(Args)]
pub(crate) struct SpacePagesArgs {
    /// Space key.
    space_key: String,

    /// Index of the first page to return.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Maximum number of pages to return.
    #[arg(long, default_value_t = DEFAULT_SPACE_PAGES_LIMIT)]
    limit: u32,

    /// Return processed storage XHTML instead of markdown.
    #[arg(long)]
    storage: bool,
}

impl SpacePagesArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let pages = fetcher(global)?.get_space_pages(
            &self.space_key,
            self.start,
            self.limit,
            !self.storage,
        )?;
        output.json(&pages)
    }
}

/// Arguments for the find command.
#[derive(Args)]
pub(crate) struct FindArgs {
    /// Space key.
    space_key: String,

    /// Exact page title.
    title: String,

    /// Return processed storage XHTML instead of markdown.
    #[arg(long)]
    storage: bool,
}

impl FindArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let page = fetcher(global)?
            .get_page_by_title(&self.space_key, &self.title, !self.storage)
            .ok_or_else(|| {
                CliError::NotFound(format!(
                    "Page '{}' not found in space {}",
                    self.title, self.space_key
                ))
            })?;
        output.json(&page)
    }
}
