//! Plan file loading.
//!
//! A plan file is a JSON snapshot of the tracker data the compiler needs:
//! the issues, the users they are assigned to and the categories that color
//! them. Fetching it from the tracker is somebody else's job.

use crate::domain::{Category, Directory, SourceItem, User};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a plan file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFile {
    /// Tracker base URL the export was taken from
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub issues: Vec<SourceItem>,
}

impl PlanFile {
    /// Read and parse a plan file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse plan file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// User and category lookup tables for compilation
    pub fn directory(&self) -> Directory {
        Directory::from((self.users.iter().cloned(), self.categories.iter().cloned()))
    }
}
