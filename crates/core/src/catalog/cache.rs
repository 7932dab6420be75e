use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::plan::PlanCollection;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedPlans {
    plans: Arc<PlanCollection>,
    stored_at: Instant,
}

/// Time-boxed holder for the last aggregated collection.
///
/// The lock is only held for reads and swaps, never while a caller recomputes,
/// so concurrent misses may each aggregate and the last store wins.
pub struct PlanCache {
    ttl: Duration,
    entry: RwLock<Option<CachedPlans>>,
}

impl PlanCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: RwLock::new(None) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self) -> Option<Arc<PlanCollection>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.plans))
    }

    pub async fn store(&self, plans: Arc<PlanCollection>) {
        let mut entry = self.entry.write().await;
        *entry = Some(CachedPlans { plans, stored_at: Instant::now() });
    }

    pub async fn invalidate(&self) {
        let mut entry = self.entry.write().await;
        *entry = None;
    }
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
