use crate::handle::Handle;

/// Errors from handle store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Update targeted a handle that is not in the mapping.
    ///
    /// Recoverable: the mapping is left unchanged and the store remains
    /// fully usable.
    #[error("no such handle: {0}")]
    NoSuchHandle(Handle),

    /// The OS entropy source failed while minting a handle.
    ///
    /// Fatal to the add call that hit it, not to the store.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Operation attempted after the store was closed.
    #[error("store is closed")]
    Closed,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
