//! Lock-serialized store: one shared mapping behind a mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::handle::{mint_unused, Handle};
use crate::traits::HandleStore;

/// Mutex-guarded implementation of [`HandleStore`].
///
/// Every operation holds the lock for its entire body, including the
/// collision-retry loop inside `add`, so add never observes a concurrent
/// mutation mid-retry. Effects are visible to all callers as soon as the
/// lock is released. Lock acquisition may queue but always proceeds; no
/// method blocks indefinitely.
pub struct LockedStore<V> {
    entries: Mutex<HashMap<Handle, V>>,
    closed: AtomicBool,
}

impl<V> LockedStore<V> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("lock poisoned").is_empty()
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl<V> Default for LockedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> HandleStore<V> for LockedStore<V>
where
    V: Clone + Send + 'static,
{
    async fn add(&self, value: V) -> StoreResult<Handle> {
        self.check_open()?;
        let mut entries = self.entries.lock().expect("lock poisoned");
        let handle = mint_unused(&*entries)?;
        entries.insert(handle.clone(), value);
        Ok(handle)
    }

    async fn get(&self, handle: &Handle) -> StoreResult<Option<V>> {
        self.check_open()?;
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries.get(handle).cloned())
    }

    async fn update(&self, handle: &Handle, value: V) -> StoreResult<()> {
        self.check_open()?;
        let mut entries = self.entries.lock().expect("lock poisoned");
        match entries.get_mut(handle) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::NoSuchHandle(handle.clone())),
        }
    }

    async fn delete(&self, handle: &Handle) -> StoreResult<()> {
        self.check_open()?;
        self.entries.lock().expect("lock poisoned").remove(handle);
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        // One-shot flag; closing twice is a no-op.
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl<V> std::fmt::Debug for LockedStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedStore")
            .field("entry_count", &self.len())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let store = LockedStore::new();
        let handle = store.add(42u32).await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), Some(42));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_handle_returns_none() {
        let store: LockedStore<u32> = LockedStore::new();
        let never_added = Handle::mint().unwrap();
        assert_eq!(store.get(&never_added).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_replaces_existing_value() {
        let store = LockedStore::new();
        let handle = store.add("before").await.unwrap();
        store.update(&handle, "after").await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), Some("after"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_handle_fails_without_mutation() {
        let store = LockedStore::new();
        let handle = store.add(1).await.unwrap();
        let unknown = Handle::mint().unwrap();

        let err = store.update(&unknown, 99).await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchHandle(_)));
        // Never inserts, never touches existing entries.
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&handle).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = LockedStore::new();
        let handle = store.add("gone soon").await.unwrap();
        store.delete(&handle).await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_handle_is_a_no_op() {
        let store = LockedStore::new();
        store.add("kept").await.unwrap();
        let unknown = Handle::mint().unwrap();
        store.delete(&unknown).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let store = LockedStore::new();
        let handle = store.add(42).await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), Some(42));
        store.update(&handle, 43).await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), Some(43));
        store.delete(&handle).await.unwrap();
        assert_eq!(store.get(&handle).await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Close semantics
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn operations_after_close_fail() {
        let store = LockedStore::new();
        let handle = store.add(7).await.unwrap();
        store.close().await.unwrap();

        assert!(matches!(store.add(8).await, Err(StoreError::Closed)));
        assert!(matches!(store.get(&handle).await, Err(StoreError::Closed)));
        assert!(matches!(
            store.update(&handle, 9).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.delete(&handle).await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn double_close_is_a_no_op() {
        let store: LockedStore<()> = LockedStore::new();
        store.close().await.unwrap();
        store.close().await.unwrap();
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_lose_no_entries() {
        const CALLERS: usize = 8;
        const ROUNDS: usize = 50;

        let store = Arc::new(LockedStore::new());
        let mut tasks = Vec::new();
        for caller in 0..CALLERS {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                for round in 0..ROUNDS {
                    let value = format!("caller-{caller}-round-{round}");
                    let handle = store.add(value.clone()).await.unwrap();
                    assert_eq!(store.get(&handle).await.unwrap(), Some(value));
                }
            }));
        }
        for task in tasks {
            task.await.expect("caller task should not panic");
        }
        assert_eq!(store.len(), CALLERS * ROUNDS);
    }
}
