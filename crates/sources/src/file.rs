use std::path::{Path, PathBuf};

use async_trait::async_trait;
use esim_catalog_core::catalog::source::{items_from_document, PlanSource, SourceError};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

/// Plan document on disk. The first existing candidate is read on every fetch
/// so a refreshed file is picked up once the catalog cache expires.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    candidates: Vec<PathBuf>,
}

impl JsonFileSource {
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { candidates: candidates.into_iter().map(Into::into).collect() }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self { candidates: vec![path.into()] }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub async fn resolve(&self) -> Option<PathBuf> {
        for candidate in &self.candidates {
            if matches!(fs::try_exists(candidate).await, Ok(true)) {
                return Some(candidate.clone());
            }
        }
        None
    }
}

#[async_trait]
impl PlanSource for JsonFileSource {
    fn describe(&self) -> String {
        let paths: Vec<String> =
            self.candidates.iter().map(|path| path.display().to_string()).collect();
        format!("json file ({})", paths.join(" | "))
    }

    async fn fetch_items(&self) -> Result<Vec<Value>, SourceError> {
        let path = self
            .resolve()
            .await
            .ok_or_else(|| SourceError::NotFound { candidates: self.candidates.clone() })?;

        let raw = fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io { path: path.clone(), source })?;
        let origin = path.display().to_string();
        let document: Value = serde_json::from_str(&raw).map_err(|error| SourceError::Parse {
            origin: origin.clone(),
            message: error.to_string(),
        })?;

        let items = items_from_document(document, &origin)?;
        debug!(
            event_name = "sources.file.read",
            path = %origin,
            items = items.len(),
            "plan document read"
        );
        Ok(items)
    }
}

/// Writes `value` as pretty JSON through a sibling temp file and a rename, so
/// readers never observe a half-written document.
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), SourceError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value).map_err(|error| SourceError::Parse {
        origin: path.display().to_string(),
        message: error.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| SourceError::Io { path: parent.to_path_buf(), source })?;
    }

    let mut temp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, bytes)
        .await
        .map_err(|source| SourceError::Io { path: temp_path.clone(), source })?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|source| SourceError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use esim_catalog_core::catalog::source::{PlanSource, SourceError};
    use serde_json::json;
    use tempfile::TempDir;

    use super::{write_json_atomic, JsonFileSource};

    #[tokio::test]
    async fn reads_first_existing_candidate() {
        let dir = TempDir::new().expect("temp dir");
        let fallback = dir.path().join("plans.json");
        fs::write(&fallback, r#"{ "items": [{ "id": "bg-1gb" }] }"#).expect("write fixture");

        let source = JsonFileSource::new([dir.path().join("public/plans.json"), fallback.clone()]);
        assert_eq!(source.resolve().await, Some(fallback));

        let items = source.fetch_items().await.expect("items");
        assert_eq!(items, vec![json!({ "id": "bg-1gb" })]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let source = JsonFileSource::single(dir.path().join("plans.json"));

        let error = source.fetch_items().await.expect_err("no file");
        assert!(matches!(error, SourceError::NotFound { ref candidates } if candidates.len() == 1));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("plans.json");
        fs::write(&path, "{ not json").expect("write fixture");

        let error = JsonFileSource::single(&path).fetch_items().await.expect_err("bad json");
        assert!(matches!(error, SourceError::Parse { .. }));
    }

    #[tokio::test]
    async fn atomic_write_creates_parents_and_leaves_no_temp_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("feeds/partner_plans.json");

        write_json_atomic(&path, &json!({ "items": [] })).await.expect("write");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("json");
        assert_eq!(written, json!({ "items": [] }));
        assert!(!dir.path().join("feeds/partner_plans.json.tmp").exists());
    }
}
