//! Shard worker threads and their mailboxes.
//!
//! Each shard runs on a dedicated OS thread that drains a FIFO of boxed
//! tasks; the shard state is owned by that thread and never shared. Callers
//! talk to a shard through [`ShardHandle::invoke`], which enqueues a closure
//! and returns a future for its reply. Mailbox order gives the delivery
//! guarantee the protocols rely on: messages from one sender to one shard
//! are observed in send order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::error;

use crate::error::{GraphError, Result};
use crate::shard::Shard;
use crate::types::ShardId;

type ShardTask = Box<dyn FnOnce(&mut Shard) + Send>;

#[derive(Clone)]
pub(crate) struct ShardHandle {
    shard_id: ShardId,
    sender: mpsc::UnboundedSender<ShardTask>,
}

impl ShardHandle {
    /// Runs `f` on the shard's worker thread. The send happens eagerly, so
    /// collecting several invoke futures before awaiting them dispatches the
    /// fan-out in parallel.
    ///
    /// A panicking task drops its reply channel; the caller observes that as
    /// [`GraphError::TaskFailed`] while the worker keeps servicing
    /// subsequent tasks.
    pub(crate) fn invoke<F, R>(&self, f: F) -> impl std::future::Future<Output = Result<R>>
    where
        F: FnOnce(&mut Shard) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let task: ShardTask = Box::new(move |shard| {
            let _ = reply.send(f(shard));
        });
        let sent = self.sender.send(task).is_ok();
        let shard_id = self.shard_id;
        async move {
            if !sent {
                return Err(GraphError::ShardUnavailable(shard_id));
            }
            receiver.await.map_err(|_| GraphError::TaskFailed(shard_id))
        }
    }
}

/// Spawns one shard worker. The shard dies when the handle side of its
/// mailbox is dropped.
pub(crate) fn spawn_shard(shard_id: ShardId, shard_count: ShardId) -> (ShardHandle, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<ShardTask>();
    let worker = std::thread::Builder::new()
        .name(format!("shard-{shard_id}"))
        .spawn(move || {
            let mut shard = Shard::new(shard_id, shard_count);
            while let Some(task) = receiver.blocking_recv() {
                if catch_unwind(AssertUnwindSafe(|| task(&mut shard))).is_err() {
                    error!(shard_id, "shard task panicked");
                }
            }
        })
        .expect("spawn shard worker");
    (ShardHandle { shard_id, sender }, worker)
}
