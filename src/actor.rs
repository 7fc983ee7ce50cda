//! Actor-serialized store: a single owner task holds the mapping and
//! serializes all access through a request channel.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::handle::{mint_unused, Handle};
use crate::traits::HandleStore;

/// Default capacity of the owner task's inbound channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A single operation submitted to the owner task.
///
/// Each request carries its own single-use reply slot, so the owner task
/// never tracks pending callers. There is no shutdown variant: closing the
/// inbound channel is the sole teardown signal.
enum Request<V> {
    Add {
        value: V,
        reply: oneshot::Sender<StoreResult<Handle>>,
    },
    Get {
        handle: Handle,
        reply: oneshot::Sender<Option<V>>,
    },
    Update {
        handle: Handle,
        value: V,
        reply: oneshot::Sender<StoreResult<()>>,
    },
    Delete {
        handle: Handle,
        reply: oneshot::Sender<()>,
    },
}

/// Owner-task implementation of [`HandleStore`].
///
/// The mapping is privately owned by one task spawned at construction. Every
/// public method builds a [`Request`] with a fresh reply slot, sends it on
/// the shared inbound channel (first suspension point), then awaits the
/// per-call reply (second suspension point). The owner task processes one
/// request at a time in arrival order, so mutations are totally ordered and
/// add's collision-retry loop needs no lock.
///
/// [`close`](HandleStore::close) takes the inbound sender; once the last
/// in-flight clone drops, the owner task drains its channel and exits.
/// Dropping the store without closing it tears the task down the same way.
pub struct ActorStore<V> {
    sender: RwLock<Option<mpsc::Sender<Request<V>>>>,
}

impl<V> ActorStore<V>
where
    V: Clone + Send + 'static,
{
    /// Spawn the owner task with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Spawn the owner task with a bounded inbound channel of `capacity`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, inbox) = mpsc::channel(capacity);
        tokio::spawn(owner_loop(inbox));
        Self {
            sender: RwLock::new(Some(sender)),
        }
    }

    /// Clone the inbound sender out, or fail if the store is closed.
    fn sender(&self) -> StoreResult<mpsc::Sender<Request<V>>> {
        self.sender
            .read()
            .expect("lock poisoned")
            .as_ref()
            .cloned()
            .ok_or(StoreError::Closed)
    }

    /// Send one request and await its reply.
    ///
    /// A caller racing close may find the channel already gone at either
    /// suspension point; both surface as [`StoreError::Closed`] rather than
    /// a hang.
    async fn submit<R>(
        &self,
        request: impl FnOnce(oneshot::Sender<R>) -> Request<V>,
    ) -> StoreResult<R> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let sender = self.sender()?;
        sender
            .send(request(reply_tx))
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)
    }
}

impl<V> Default for ActorStore<V>
where
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> HandleStore<V> for ActorStore<V>
where
    V: Clone + Send + 'static,
{
    async fn add(&self, value: V) -> StoreResult<Handle> {
        self.submit(|reply| Request::Add { value, reply }).await?
    }

    async fn get(&self, handle: &Handle) -> StoreResult<Option<V>> {
        let handle = handle.clone();
        self.submit(|reply| Request::Get { handle, reply }).await
    }

    async fn update(&self, handle: &Handle, value: V) -> StoreResult<()> {
        let handle = handle.clone();
        self.submit(|reply| Request::Update { handle, value, reply })
            .await?
    }

    async fn delete(&self, handle: &Handle) -> StoreResult<()> {
        let handle = handle.clone();
        self.submit(|reply| Request::Delete { handle, reply }).await
    }

    async fn close(&self) -> StoreResult<()> {
        // One-shot: taking the sender closes the inbound channel once the
        // last in-flight clone drops. A second close finds None and is a
        // no-op.
        self.sender.write().expect("lock poisoned").take();
        Ok(())
    }
}

impl<V> std::fmt::Debug for ActorStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let closed = self.sender.read().expect("lock poisoned").is_none();
        f.debug_struct("ActorStore").field("closed", &closed).finish()
    }
}

/// The owner task: drains the inbound channel one request at a time.
///
/// Exits when the channel is closed and fully drained. Replies to callers
/// that have since given up are dropped silently.
async fn owner_loop<V>(mut inbox: mpsc::Receiver<Request<V>>)
where
    V: Clone + Send + 'static,
{
    debug!("handle store owner task started");
    let mut entries: HashMap<Handle, V> = HashMap::new();
    while let Some(request) = inbox.recv().await {
        match request {
            Request::Add { value, reply } => {
                let result = mint_unused(&entries).map(|handle| {
                    entries.insert(handle.clone(), value);
                    handle
                });
                let _ = reply.send(result);
            }
            Request::Get { handle, reply } => {
                let _ = reply.send(entries.get(&handle).cloned());
            }
            Request::Update { handle, value, reply } => {
                let result = match entries.get_mut(&handle) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(StoreError::NoSuchHandle(handle)),
                };
                let _ = reply.send(result);
            }
            Request::Delete { handle, reply } => {
                entries.remove(&handle);
                let _ = reply.send(());
            }
        }
    }
    debug!(entries = entries.len(), "handle store owner task exiting");
}
