use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use esim_catalog_core::catalog::source::SourceError;
use esim_catalog_core::config::AppConfig;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::file::write_json_atomic;
use crate::metadata::{
    feed_file_status, needs_refresh, read_metadata, write_metadata, FeedFileStatus, FeedMetadata,
};
use crate::schedule::next_weekly_run;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("partner feed refresh is disabled (set partner.enabled = true)")]
    Disabled,
    #[error("partner feed refresh is not configured: {0}")]
    NotConfigured(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { plans: usize, metadata: FeedMetadata },
    AlreadyRunning,
}

#[derive(Clone, Debug)]
pub struct RefreshSettings {
    pub api_url: String,
    pub api_key: SecretString,
    pub partner_id: Option<String>,
    pub feed_path: PathBuf,
    pub metadata_path: PathBuf,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl RefreshSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, RefreshError> {
        if !config.partner.enabled {
            return Err(RefreshError::Disabled);
        }

        let api_url = config
            .partner
            .api_url
            .clone()
            .ok_or_else(|| RefreshError::NotConfigured("partner.api_url is missing".to_string()))?;
        let api_key = config
            .partner
            .api_key
            .clone()
            .ok_or_else(|| RefreshError::NotConfigured("partner.api_key is missing".to_string()))?;

        Ok(Self {
            api_url,
            api_key,
            partner_id: config.partner.partner_id.clone(),
            feed_path: config.catalog.partner_feed_path.clone(),
            metadata_path: config.partner.metadata_path.clone(),
            timeout: config.partner.timeout(),
            max_age: config.partner.max_age(),
        })
    }
}

/// Pulls the partner plans document and replaces the local feed file.
///
/// Only one refresh runs at a time per refresher; overlapping calls return
/// [`RefreshOutcome::AlreadyRunning`] without touching the network.
pub struct FeedRefresher {
    client: reqwest::Client,
    settings: RefreshSettings,
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FeedRefresher {
    pub fn new(settings: RefreshSettings) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| SourceError::Http(error.to_string()))?;
        Ok(Self { client, settings, running: AtomicBool::new(false) })
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> (FeedFileStatus, Option<FeedMetadata>) {
        let status = feed_file_status(&self.settings.feed_path).await;
        let metadata = read_metadata(&self.settings.metadata_path).await;
        (status, metadata)
    }

    pub async fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        let (status, metadata) = self.status().await;
        needs_refresh(&status, metadata.as_ref(), now, self.settings.max_age)
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let claimed =
            self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire);
        if claimed.is_err() {
            info!(event_name = "sources.refresh.skipped", "partner feed refresh already running");
            return Ok(RefreshOutcome::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        info!(
            event_name = "sources.refresh.started",
            api_url = %self.settings.api_url,
            "refreshing partner plan feed"
        );
        let previous = read_metadata(&self.settings.metadata_path).await;

        let result = match self.fetch_document().await {
            Ok((document, plans)) => {
                write_json_atomic(&self.settings.feed_path, &document).await.map(|()| plans)
            }
            Err(error) => Err(error),
        };

        let now = Utc::now();
        let attempt_error = result.as_ref().err().map(ToString::to_string);
        let metadata = FeedMetadata::after_attempt(
            previous.as_ref(),
            now,
            next_weekly_run(now),
            attempt_error,
        );
        if let Err(write_error) = write_metadata(&self.settings.metadata_path, &metadata).await {
            warn!(
                event_name = "sources.refresh.metadata_write_failed",
                error = %write_error,
                "could not update partner feed metadata"
            );
        }

        match result {
            Ok(plans) => {
                info!(
                    event_name = "sources.refresh.completed",
                    plans,
                    update_count = metadata.update_count,
                    next_update = %metadata.next_update,
                    "partner plan feed refreshed"
                );
                Ok(RefreshOutcome::Updated { plans, metadata })
            }
            Err(source_error) => {
                error!(
                    event_name = "sources.refresh.failed",
                    error = %source_error,
                    "partner plan feed refresh failed"
                );
                Err(RefreshError::Source(source_error))
            }
        }
    }

    async fn fetch_document(&self) -> Result<(Value, usize), SourceError> {
        let mut request = self
            .client
            .get(&self.settings.api_url)
            .header("x-api-key", self.settings.api_key.expose_secret())
            .header(ACCEPT, "application/json");
        if let Some(partner_id) = &self.settings.partner_id {
            request = request.header("x-partner-id", partner_id.as_str());
        }

        let response = request.send().await.map_err(|error| SourceError::Http(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("unexpected status {status}")));
        }

        let document: Value = response.json().await.map_err(|error| SourceError::Parse {
            origin: self.settings.api_url.clone(),
            message: error.to_string(),
        })?;

        let plans = document
            .as_object()
            .and_then(|object| object.get("items"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| SourceError::Parse {
                origin: self.settings.api_url.clone(),
                message: "response is not an object with an `items` array".to_string(),
            })?;

        Ok((document, plans))
    }
}
