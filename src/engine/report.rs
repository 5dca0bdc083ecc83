//! Per-run outcome bookkeeping.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;
use crate::voice::ReferenceSource;

/// Errors that can occur while saving a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] AudioError),
}

/// What happened to one emotion category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryStatus {
    Processed,
    MissingInput,
    NotADirectory,
    NoReference,
    NoItems,
    Unreadable { error: String },
}

/// What happened to one text file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemStatus {
    Saved,
    Empty,
    Unreadable { error: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryReport {
    pub emotion: String,
    pub status: CategoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSource>,
    pub items: Vec<ItemReport>,
}

impl CategoryReport {
    pub(crate) fn skipped(emotion: &str, status: CategoryStatus) -> Self {
        Self {
            emotion: emotion.to_string(),
            status,
            reference: None,
            items: Vec::new(),
        }
    }
}

/// Summary of a whole batch run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub backend: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub categories: Vec<CategoryReport>,
}

impl BatchReport {
    fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn saved_count(&self) -> usize {
        self.items()
            .filter(|i| i.status == ItemStatus::Saved)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.items()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
            .count()
    }

    /// Empty or unreadable items.
    pub fn skipped_count(&self) -> usize {
        self.items()
            .filter(|i| matches!(i.status, ItemStatus::Empty | ItemStatus::Unreadable { .. }))
            .count()
    }

    pub fn category(&self, emotion: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.emotion == emotion)
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        crate::audio::write_atomic(path, json.as_bytes())?;
        Ok(())
    }
}
