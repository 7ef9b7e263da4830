//! Runtime settings, built once in `main` from the command line and passed
//! down explicitly.

use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMIT_TEMPLATE: &str = "${message} • ${author}, ${ago} (${id})";
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y %-I:%M%P";
pub const DEFAULT_MAX_COMMITS: usize = 25;
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Display and depth settings for the history tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerConfig {
    /// Append the upstream branch to local branch labels
    pub show_tracking_branch: bool,
    /// Commit label template, see `CommitFormatter`
    pub commit_template: String,
    /// chrono format string for `${date}`
    pub date_format: String,
    /// Commits listed per branch before "show more"; `None` lists everything
    pub max_commits: Option<usize>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            show_tracking_branch: true,
            commit_template: DEFAULT_COMMIT_TEMPLATE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_commits: Some(DEFAULT_MAX_COMMITS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub repo_path: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub explorer: ExplorerConfig,
}

/// Rejects date formats chrono cannot render, such as unknown `%` specifiers.
pub fn validate_date_format(format: &str) -> Result<(), String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date format: {format:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_date_format_is_valid() {
        assert!(validate_date_format(DEFAULT_DATE_FORMAT).is_ok());
        assert!(validate_date_format("%Y-%m-%d").is_ok());
    }

    #[test]
    fn unknown_specifier_is_rejected() {
        assert!(validate_date_format("%Q").is_err());
        assert!(validate_date_format("%Y %").is_err());
    }
}
