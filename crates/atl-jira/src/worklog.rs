//! Worklog operations.

use atl_markup::TextPreprocessor;
use serde_json::json;
use tracing::{error, info, warn};

use crate::api::JiraApi;
use crate::dates::jira_now;
use crate::duration::parse_time_spent;
use crate::error::JiraError;
use crate::fetcher::{JiraFetcher, classify, decode_object};
use crate::models::{AddedWorklog, Worklog};
use crate::types::{RawWorklog, RawWorklogPage};

/// Work to log on an issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewWorklog<'a> {
    /// Duration such as `1h 30m`, see [`parse_time_spent`].
    pub time_spent: &'a str,
    /// Markdown comment.
    pub comment: Option<&'a str>,
    /// Start time in Jira's timestamp format; now when absent.
    pub started: Option<&'a str>,
    /// Replaces the issue's original estimate before logging.
    pub original_estimate: Option<&'a str>,
    /// Replaces the issue's remaining estimate.
    pub remaining_estimate: Option<&'a str>,
}

impl<A: JiraApi, P: TextPreprocessor> JiraFetcher<A, P> {
    /// Raw worklog listing of an issue.
    ///
    /// Failures are logged and give an empty listing.
    pub fn get_worklog(&self, issue_key: &str) -> RawWorklogPage {
        let page = self
            .api
            .issue_get_worklog(issue_key)
            .map_err(JiraError::Api)
            .and_then(|response| decode_object(response, "worklog"));
        match page {
            Ok(page) => page,
            Err(e) => {
                warn!("Error getting worklog for {}: {}", issue_key, e);
                RawWorklogPage::default()
            }
        }
    }

    /// Worklogs of an issue with comments left in wiki markup.
    ///
    /// Failures are logged and give an empty list.
    pub fn get_worklog_models(&self, issue_key: &str) -> Vec<Worklog> {
        self.get_worklog(issue_key)
            .worklogs
            .iter()
            .map(|raw| Worklog::from_raw(raw, raw.comment.clone()))
            .collect()
    }

    /// Worklogs of an issue with comments converted to readable text.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with "Error getting worklogs".
    pub fn get_worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>, JiraError> {
        self.fetch_worklogs(issue_key).map_err(|err| {
            error!("Error getting worklogs for issue {}: {}", issue_key, err);
            err.context("Error getting worklogs")
        })
    }

    fn fetch_worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>, JiraError> {
        let response = self.api.issue_get_worklog(issue_key).map_err(classify)?;
        let page: RawWorklogPage = decode_object(response, "worklog")?;

        Ok(page
            .worklogs
            .iter()
            .map(|raw| Worklog::from_raw(raw, self.clean_text(&raw.comment)))
            .collect())
    }

    /// Log work on an issue.
    ///
    /// The original estimate is updated first when requested; a failure
    /// there is logged and reported through
    /// [`AddedWorklog::original_estimate_updated`] without aborting.
    ///
    /// # Errors
    ///
    /// Every failure to log the work is wrapped with "Error adding worklog".
    pub fn add_worklog(
        &self,
        issue_key: &str,
        worklog: &NewWorklog<'_>,
    ) -> Result<AddedWorklog, JiraError> {
        let original_estimate_updated = worklog
            .original_estimate
            .is_some_and(|estimate| self.update_original_estimate(issue_key, estimate));

        let added = self.post_worklog(issue_key, worklog).map_err(|err| {
            error!("Error adding worklog to issue {}: {}", issue_key, err);
            err.context("Error adding worklog")
        })?;

        Ok(AddedWorklog {
            worklog: added,
            original_estimate_updated,
        })
    }

    fn update_original_estimate(&self, issue_key: &str, estimate: &str) -> bool {
        let fields = json!({"timetracking": {"originalEstimate": estimate}});
        match self.api.update_issue_fields(issue_key, &fields) {
            Ok(()) => {
                info!("Set original estimate of {} to {}", issue_key, estimate);
                true
            }
            Err(e) => {
                error!("Failed to update original estimate for {}: {}", issue_key, e);
                false
            }
        }
    }

    fn post_worklog(&self, issue_key: &str, worklog: &NewWorklog<'_>) -> Result<Worklog, JiraError> {
        let mut payload = json!({
            "timeSpentSeconds": parse_time_spent(worklog.time_spent),
            "started": worklog.started.map_or_else(jira_now, str::to_owned),
        });
        if let Some(comment) = worklog.comment.filter(|comment| !comment.is_empty()) {
            payload["comment"] = json!(self.markdown_to_jira(comment));
        }

        let response = self
            .api
            .issue_add_worklog(issue_key, &payload, worklog.remaining_estimate)
            .map_err(classify)?;
        let raw: RawWorklog = decode_object(response, "worklog")?;
        Ok(Worklog::from_raw(&raw, self.clean_text(&raw.comment)))
    }
}
