use async_trait::async_trait;

use crate::error::StoreResult;
use crate::handle::Handle;

/// Handle-addressed value store.
///
/// All implementations must satisfy these invariants:
/// - Every handle present in the mapping was minted by this store and has
///   not since been deleted.
/// - At most one mutation is in flight at any instant; operations are
///   linearizable — each call's effect is fully applied before it returns,
///   and concurrent calls behave as if executed one at a time.
/// - Freshly minted handles never collide with a live handle: presence is
///   re-checked before a candidate is accepted, under the same exclusivity
///   as the insert itself.
/// - The store never interprets stored values.
#[async_trait]
pub trait HandleStore<V>: Send + Sync
where
    V: Clone + Send + 'static,
{
    /// Store a value at a freshly minted handle and return the handle.
    async fn add(&self, value: V) -> StoreResult<Handle>;

    /// Read the value stored at a handle.
    ///
    /// Returns `Ok(None)` if the handle is not present; absence is a
    /// normal outcome, not an error.
    async fn get(&self, handle: &Handle) -> StoreResult<Option<V>>;

    /// Replace the value stored at an existing handle.
    ///
    /// Never inserts: fails with [`StoreError::NoSuchHandle`] if the handle
    /// is absent, leaving the mapping unchanged.
    ///
    /// [`StoreError::NoSuchHandle`]: crate::error::StoreError::NoSuchHandle
    async fn update(&self, handle: &Handle, value: V) -> StoreResult<()>;

    /// Remove the entry at a handle. A no-op if the handle is absent.
    async fn delete(&self, handle: &Handle) -> StoreResult<()>;

    /// Tear the store down, releasing any owner task and channel resources.
    ///
    /// Idempotent: a second close is a no-op. After close, every other
    /// operation returns [`StoreError::Closed`] rather than blocking.
    ///
    /// [`StoreError::Closed`]: crate::error::StoreError::Closed
    async fn close(&self) -> StoreResult<()>;
}
