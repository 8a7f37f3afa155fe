//! Support for the user's configuration file

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SettingsError;
use crate::Ledger;

/// The user's configuration, read from a JSON file.
///
/// Only the feed URL and the API token are mandatory; everything else has a sensible default.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub feed: FeedSettings,
    pub todoist: TodoistSettings,

    /// Where the import ledger is persisted
    #[serde(default = "default_storage")]
    pub storage: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    /// The calendar feed URL (`https://` or `webcal://`)
    pub calendar: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TodoistSettings {
    pub api_token: String,

    /// The project imported tasks are created in (created on the fly when missing)
    #[serde(default = "default_project")]
    pub project: String,

    /// Labels added to every imported task
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

fn default_storage() -> PathBuf {
    Ledger::default_path()
}

fn default_project() -> String {
    "Inbox".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["Todology".to_string()]
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read(path)?;
        let settings = serde_json::from_slice(&contents)?;
        Ok(settings)
    }
}
