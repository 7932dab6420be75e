use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("plan file not found in any of: {}", display_paths(.candidates))]
    NotFound { candidates: Vec<PathBuf> },
    #[error("could not read `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not parse plan document from {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("partner api request failed: {0}")]
    Http(String),
    #[error("plan source unavailable: {0}")]
    Unavailable(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|path| format!("`{}`", path.display())).collect::<Vec<_>>().join(", ")
}

/// Which side of the aggregation a source feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRole {
    Local,
    Partner,
}

impl SourceRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Partner => "partner",
        }
    }
}

/// A raw plan document reader.
///
/// Sources only deliver the `items` array of their document; shape validation
/// happens in the catalog so a single bad record never fails the whole source.
#[async_trait]
pub trait PlanSource: Send + Sync {
    fn describe(&self) -> String;

    async fn fetch_items(&self) -> Result<Vec<Value>, SourceError>;
}

#[async_trait]
impl<S> PlanSource for std::sync::Arc<S>
where
    S: PlanSource + ?Sized,
{
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch_items(&self) -> Result<Vec<Value>, SourceError> {
        (**self).fetch_items().await
    }
}

/// Extracts `items` from a `{ "items": [...] }` document. A bare array is
/// accepted as well.
pub fn items_from_document(document: Value, origin: &str) -> Result<Vec<Value>, SourceError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(SourceError::Parse {
                origin: origin.to_string(),
                message: "`items` must be an array".to_string(),
            }),
            None => Err(SourceError::Parse {
                origin: origin.to_string(),
                message: "document has no `items` array".to_string(),
            }),
        },
        _ => Err(SourceError::Parse {
            origin: origin.to_string(),
            message: "document must be an object or an array".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{items_from_document, SourceError};

    #[test]
    fn extracts_items_from_wrapped_and_bare_documents() {
        let wrapped = items_from_document(json!({ "items": [{ "id": "a" }] }), "test")
            .expect("wrapped document");
        assert_eq!(wrapped.len(), 1);

        let bare = items_from_document(json!([{ "id": "a" }, { "id": "b" }]), "test")
            .expect("bare array");
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn rejects_documents_without_items() {
        let error = items_from_document(json!({ "plans": [] }), "feed.json")
            .expect_err("missing items should fail");
        assert!(matches!(error, SourceError::Parse { ref origin, .. } if origin == "feed.json"));

        assert!(items_from_document(json!("nope"), "feed.json").is_err());
    }
}
