//! Handle-addressed in-memory value store.
//!
//! Callers store arbitrary values, receive an opaque [`Handle`], and later
//! retrieve, replace, or remove the value by that handle. Two
//! interchangeable implementations share the [`HandleStore`] contract:
//!
//! - [`LockedStore`] — one shared mapping behind a mutex; every operation
//!   holds the lock for its whole body.
//! - [`ActorStore`] — one owner task privately holds the mapping; every
//!   operation is a request message answered over a per-call reply channel,
//!   and the task is torn down by closing its inbound channel.
//!
//! # Design Rules
//!
//! 1. Every live handle was minted by its own store and has not since been
//!    deleted.
//! 2. At most one mutation is in flight at any instant; operations are
//!    linearizable.
//! 3. Handle minting retries until the candidate is unused, under the same
//!    exclusivity as every other mutation.
//! 4. The store never interprets stored values.
//! 5. Absence on read is `Ok(None)`, never an error; deleting a missing
//!    handle is a no-op.
//! 6. After [`close`](HandleStore::close), every operation returns
//!    [`StoreError::Closed`] — never an indefinite block.

pub mod actor;
pub mod error;
pub mod handle;
pub mod locked;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use actor::ActorStore;
pub use error::{StoreError, StoreResult};
pub use handle::Handle;
pub use locked::LockedStore;
pub use traits::HandleStore;
