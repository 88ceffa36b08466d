//! Debounced remote synchronization.
//!
//! Local writes are cheap and frequent; remote writes are slow and
//! rate-limited. The scheduler holds a single pending slot with the
//! latest full snapshot and flushes it once the quiet period passes
//! without another write, so a burst of N edits costs one remote call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

use satchel_core::Capture;
use satchel_store::RemoteStore;

/// What the write that triggered this schedule did. Lets the flush
/// pick the cheap append path when only one new capture is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Created(String),
    Other,
}

struct Pending {
    snapshot: Vec<Capture>,
    ops: Vec<WriteOp>,
    deadline: Instant,
}

/// Coalescing write-behind scheduler for the remote store.
pub struct SyncScheduler {
    remote: Arc<dyn RemoteStore>,
    quiet: Duration,
    pending: Mutex<Option<Pending>>,
    notify: Notify,
    stopping: AtomicBool,
    /// Set after a failed flush; the next flush bulk-replaces so the
    /// remote catches up on everything it missed.
    degraded: AtomicBool,
}

impl SyncScheduler {
    pub fn new(remote: Arc<dyn RemoteStore>, quiet: Duration) -> Arc<Self> {
        Arc::new(Self {
            remote,
            quiet,
            pending: Mutex::new(None),
            notify: Notify::new(),
            stopping: AtomicBool::new(false),
            degraded: AtomicBool::new(false),
        })
    }

    /// Record a local write. Replaces any pending snapshot and pushes
    /// the flush deadline out by the quiet period.
    pub fn schedule(&self, snapshot: Vec<Capture>, op: WriteOp) {
        let deadline = Instant::now() + self.quiet;
        let mut pending = self.pending.lock();
        match pending.as_mut() {
            Some(p) => {
                p.snapshot = snapshot;
                p.ops.push(op);
                p.deadline = deadline;
            }
            None => {
                *pending = Some(Pending {
                    snapshot,
                    ops: vec![op],
                    deadline,
                });
            }
        }
        drop(pending);
        self.notify.notify_one();
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Flush the pending snapshot now, if any. One new capture since
    /// the last flush appends; anything else bulk-replaces.
    pub async fn flush(&self) {
        let Some(pending) = self.pending.lock().take() else {
            return;
        };

        let single_create = match pending.ops.as_slice() {
            [WriteOp::Created(id)] if !self.degraded.load(Ordering::SeqCst) => {
                pending.snapshot.iter().find(|c| &c.id == id).cloned()
            }
            _ => None,
        };

        let result = match &single_create {
            Some(capture) => self.remote.append(capture).await,
            None => self.remote.save_all(&pending.snapshot).await,
        };

        match result {
            Ok(()) => {
                self.degraded.store(false, Ordering::SeqCst);
                debug!(
                    "Synced {} captures to remote ({})",
                    pending.snapshot.len(),
                    if single_create.is_some() { "append" } else { "bulk" },
                );
            }
            Err(e) => {
                warn!("Remote sync failed, will retry on next write: {}", e);
                self.degraded.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Spawn the background flush task. Runs until `shutdown` is
    /// called, flushing whenever a deadline elapses.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if this.stopping.load(Ordering::SeqCst) {
                    this.flush().await;
                    break;
                }
                let deadline = this.pending.lock().as_ref().map(|p| p.deadline);
                match deadline {
                    Some(d) if Instant::now() >= d => this.flush().await,
                    Some(d) => {
                        tokio::select! {
                            _ = tokio::time::sleep_until(d) => {}
                            _ = this.notify.notified() => {}
                        }
                    }
                    None => this.notify.notified().await,
                }
            }
        })
    }

    /// Stop the background task, flushing anything still pending.
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }
}
