use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Memoizes async lookups per key.
///
/// Each key gets its own [`OnceCell`], so concurrent callers asking for the
/// same key wait on one factory call instead of racing. A failed factory
/// leaves the cell empty and the next caller tries again.
pub struct RecordCache<K, V> {
    cells: RwLock<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> RecordCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get<F, Fut, E>(&self, key: &K, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key).await;
        cell.get_or_try_init(factory).await.cloned()
    }

    /// Drops every memoized value. In-flight lookups finish against the old cells.
    pub async fn invalidate_all(&self) {
        let mut cells = self.cells.write().await;
        let dropped = cells.len();
        cells.clear();
        tracing::debug!(dropped, "Record cache invalidated");
    }

    async fn cell(&self, key: &K) -> Arc<OnceCell<V>> {
        if let Some(cell) = self.cells.read().await.get(key) {
            return Arc::clone(cell);
        }

        let mut cells = self.cells.write().await;
        Arc::clone(
            cells
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}

impl<K, V> Default for RecordCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
