//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! `AppState` holds the [`OrderLifecycle`](crate::lifecycle::OrderLifecycle)
//! orchestrator (which owns the order store, the collaborator handles, and
//! the notification verifier) plus application configuration. Route
//! handlers contain no business logic — they validate input, delegate to
//! the lifecycle, and shape the response.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use notelock_core::OrderId;

use crate::lifecycle::OrderLifecycle;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory order-keyed store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<OrderId, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: OrderId, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert a record only if the key is absent. Returns `false` (and
    /// leaves the store untouched) if the key already existed. Runs under
    /// a single write lock, so concurrent duplicate creations cannot both
    /// succeed.
    pub fn insert_if_absent(&self, id: OrderId, value: T) -> bool {
        let mut guard = self.data.write();
        if guard.contains_key(&id) {
            return false;
        }
        guard.insert(id, value);
        true
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &OrderId) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &OrderId,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &OrderId) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the lifecycle's store, pool handle, and collaborator
/// handles are all `Arc`-backed.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The payment-order lifecycle orchestrator.
    pub lifecycle: OrderLifecycle,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from a configured lifecycle.
    pub fn new(config: AppConfig, lifecycle: OrderLifecycle) -> Self {
        Self { lifecycle, config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_if_absent_rejects_duplicates() {
        let store: Store<u32> = Store::new();
        let id = OrderId::new("N1").unwrap();
        assert!(store.insert_if_absent(id.clone(), 1));
        assert!(!store.insert_if_absent(id.clone(), 2));
        assert_eq!(store.get(&id), Some(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn try_update_runs_under_one_lock() {
        let store: Store<u32> = Store::new();
        let id = OrderId::new("N1").unwrap();
        store.insert(id.clone(), 1);

        let result: Option<Result<u32, &str>> = store.try_update(&id, |v| {
            *v += 1;
            Ok(*v)
        });
        assert_eq!(result, Some(Ok(2)));
        assert_eq!(store.get(&id), Some(2));

        let missing = OrderId::new("N2").unwrap();
        let absent: Option<Result<u32, &str>> = store.try_update(&missing, |v| Ok(*v));
        assert!(absent.is_none());
    }

    #[test]
    fn clones_share_data() {
        let store: Store<u32> = Store::new();
        let clone = store.clone();
        clone.insert(OrderId::new("N1").unwrap(), 7);
        assert_eq!(store.len(), 1);
    }
}
