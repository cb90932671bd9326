//! CLI commands.

mod confluence;
mod jira;

use std::path::{Path, PathBuf};

use atl_config::{CliSettings, Config};
use clap::Args;

use crate::GlobalArgs;
use crate::error::CliError;

pub(crate) use confluence::ConfluenceCommand;
pub(crate) use jira::JiraCommand;

/// Load configuration with the global URL overrides applied.
pub(crate) fn load_config(
    global: &GlobalArgs,
    force_internal_comments: Option<bool>,
) -> Result<Config, CliError> {
    let cli_settings = CliSettings {
        confluence_url: global.confluence_url.clone(),
        jira_url: global.jira_url.clone(),
        force_internal_comments,
    };
    Ok(Config::load(global.config.as_deref(), Some(&cli_settings))?)
}

/// Text given inline or read from a file.
#[derive(Args)]
pub(crate) struct BodyArgs {
    /// Inline content.
    #[arg(long, conflicts_with = "file")]
    pub body: Option<String>,

    /// Read content from a file (`-` for stdin).
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl BodyArgs {
    pub(crate) fn read(self) -> Result<String, CliError> {
        match (self.body, self.file) {
            (Some(body), _) => Ok(body),
            (None, Some(path)) => read_file(&path),
            (None, None) => Err(CliError::Validation(
                "Either --body or --file is required".to_owned(),
            )),
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        return Ok(std::io::read_to_string(std::io::stdin())?);
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_body_inline() {
        let args = BodyArgs {
            body: Some("# Title".to_owned()),
            file: None,
        };
        assert_eq!(args.read().unwrap(), "# Title");
    }

    #[test]
    fn test_body_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Hello **world**").unwrap();

        let args = BodyArgs {
            body: None,
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(args.read().unwrap(), "Hello **world**");
    }

    #[test]
    fn test_body_missing() {
        let args = BodyArgs {
            body: None,
            file: None,
        };
        assert!(matches!(args.read(), Err(CliError::Validation(_))));
    }
}
