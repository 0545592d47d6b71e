use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Memo table that lives as long as the process. Clones share entries.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the memoized value for `key`, computing it with `compute` on
    /// the first request. The lock is held while `compute` runs.
    pub async fn get_or_insert_with<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(value) = entries.get(&key) {
            debug!(?key, "Memo hit");
            return value.clone();
        }
        debug!(?key, "Memo miss");
        let value = compute().await;
        entries.insert(key, value.clone());
        value
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_compute_runs_once_per_key() {
        let cache = Cache::<(String, u32), f64>::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            153.0
        };

        let key = ("AAPL".to_string(), 30);
        assert_eq!(cache.get_or_insert_with(key.clone(), compute).await, 153.0);
        assert_eq!(cache.get_or_insert_with(key.clone(), compute).await, 153.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache
            .get_or_insert_with(("AAPL".to_string(), 60), compute)
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = Cache::<String, Option<f64>>::new();
        let other = cache.clone();

        other
            .get_or_insert_with("INVALID123".to_string(), || async { None })
            .await;
        assert_eq!(cache.len().await, 1);
        let cached = cache
            .get_or_insert_with("INVALID123".to_string(), || async { Some(1.0) })
            .await;
        assert_eq!(cached, None);
    }
}
