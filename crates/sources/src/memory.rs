use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use esim_catalog_core::catalog::source::{PlanSource, SourceError};
use serde_json::Value;
use tokio::sync::RwLock;

/// Plan items held in memory. Can be switched into a failing state to
/// exercise degraded aggregation.
#[derive(Default)]
pub struct InMemorySource {
    items: RwLock<Vec<Value>>,
    failure: RwLock<Option<String>>,
    fetches: AtomicUsize,
}

impl InMemorySource {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items: RwLock::new(items), ..Self::default() }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: RwLock::new(Some(reason.into())), ..Self::default() }
    }

    pub async fn replace(&self, items: Vec<Value>) {
        *self.items.write().await = items;
    }

    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write().await = Some(reason.into());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanSource for InMemorySource {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    async fn fetch_items(&self) -> Result<Vec<Value>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(SourceError::Unavailable(reason.clone()));
        }
        Ok(self.items.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use esim_catalog_core::catalog::source::{PlanSource, SourceError};
    use serde_json::json;

    use super::InMemorySource;

    #[tokio::test]
    async fn serves_items_and_counts_fetches() {
        let source = InMemorySource::new(vec![json!({ "id": "a" })]);
        assert_eq!(source.fetch_items().await.expect("items").len(), 1);

        source.replace(vec![json!({ "id": "a" }), json!({ "id": "b" })]).await;
        assert_eq!(source.fetch_items().await.expect("items").len(), 2);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn failure_can_be_toggled() {
        let source = InMemorySource::failing("partner offline");
        assert!(matches!(source.fetch_items().await, Err(SourceError::Unavailable(_))));

        source.recover().await;
        assert!(source.fetch_items().await.expect("recovered").is_empty());

        source.fail_with("again").await;
        assert!(source.fetch_items().await.is_err());
        assert_eq!(source.fetch_count(), 3);
    }
}
