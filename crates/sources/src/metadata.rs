use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use esim_catalog_core::catalog::source::SourceError;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::file::write_json_atomic;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Success,
    Error,
    Pending,
}

/// Bookkeeping kept next to the partner feed file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetadata {
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    #[serde(default)]
    pub update_count: u64,
    pub status: FeedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl FeedMetadata {
    /// Metadata after an attempt. The counter grows on failures too.
    pub fn after_attempt(
        previous: Option<&FeedMetadata>,
        now: DateTime<Utc>,
        next_update: DateTime<Utc>,
        error: Option<String>,
    ) -> Self {
        Self {
            last_updated: now,
            next_update,
            update_count: previous.map_or(0, |metadata| metadata.update_count) + 1,
            status: if error.is_some() { FeedStatus::Error } else { FeedStatus::Success },
            last_error: error,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeedFileStatus {
    pub exists: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

pub async fn feed_file_status(path: &Path) -> FeedFileStatus {
    match fs::metadata(path).await {
        Ok(metadata) => FeedFileStatus {
            exists: true,
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            size: Some(metadata.len()),
        },
        Err(_) => FeedFileStatus::default(),
    }
}

/// Missing or unreadable metadata reads as `None`.
pub async fn read_metadata(path: &Path) -> Option<FeedMetadata> {
    let raw = fs::read_to_string(path).await.ok()?;
    match serde_json::from_str(&raw) {
        Ok(metadata) => Some(metadata),
        Err(error) => {
            debug!(
                event_name = "sources.metadata.unreadable",
                path = %path.display(),
                error = %error,
                "ignoring unreadable feed metadata"
            );
            None
        }
    }
}

pub async fn write_metadata(path: &Path, metadata: &FeedMetadata) -> Result<(), SourceError> {
    write_json_atomic(path, metadata).await
}

/// True when the feed file or its metadata is missing, the last attempt
/// failed, or the file is older than `max_age`.
pub fn needs_refresh(
    status: &FeedFileStatus,
    metadata: Option<&FeedMetadata>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    if !status.exists {
        return true;
    }

    match metadata {
        None => return true,
        Some(metadata) if metadata.status == FeedStatus::Error => return true,
        Some(_) => {}
    }

    match status.last_modified {
        Some(modified) => (now - modified).to_std().map_or(false, |age| age > max_age),
        None => false,
    }
}
