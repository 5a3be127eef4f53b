//! Background reaper for the expiring cache
//!
//! Runs a tokio interval that removes entries older than the cache's TTL.
//! The task stops when a shutdown signal arrives or when its handle is
//! dropped and the shutdown channel closes. Outside a tokio runtime the loop
//! runs on its own thread with a single-threaded runtime.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::expiring::Entry;

/// Entry map shared between the cache handle and its reaper
pub(crate) type EntryMap = Arc<Mutex<HashMap<String, Entry>>>;

/// Where the reaping loop is running
#[derive(Debug)]
enum ReaperTask {
    /// Spawned on the caller's runtime
    Task(JoinHandle<()>),
    /// Dedicated thread, used when no runtime was available
    Thread(thread::JoinHandle<()>),
}

/// Handle for controlling a running reaper
#[derive(Debug)]
pub(crate) struct ReaperHandle {
    /// Signals the loop to exit; dropping it has the same effect
    shutdown_tx: mpsc::Sender<()>,
    /// The running loop, taken by `shutdown` to await completion
    task: Mutex<Option<ReaperTask>>,
}

impl ReaperHandle {
    /// Starts the reaping loop
    ///
    /// Uses the current tokio runtime when there is one, otherwise a
    /// dedicated `cache-reaper` thread.
    ///
    /// # Arguments
    /// * `entries` - The map to reap
    /// * `ttl` - Entries at least this old are removed
    /// * `period` - Time between reaper passes
    pub(crate) fn spawn(entries: EntryMap, ttl: Duration, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let reaping = reap_loop(entries, ttl, period, shutdown_rx);

        let task = match Handle::try_current() {
            Ok(handle) => Some(ReaperTask::Task(handle.spawn(reaping))),
            Err(_) => spawn_reaper_thread(reaping),
        };

        Self {
            shutdown_tx,
            task: Mutex::new(task),
        }
    }

    /// Asks the reaper to stop without waiting for it
    pub(crate) fn stop(&self) {
        // A full or closed channel means a stop is already pending or done
        let _ = self.shutdown_tx.try_send(());
    }

    /// Stops the reaper and waits for it to finish
    pub(crate) async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        match task {
            Some(ReaperTask::Task(task)) => {
                if let Err(err) = task.await {
                    tracing::warn!(error = %err, "cache reaper exited abnormally");
                }
            }
            Some(ReaperTask::Thread(thread)) => {
                let joined = if Handle::try_current().is_ok() {
                    tokio::task::spawn_blocking(move || thread.join().is_ok())
                        .await
                        .unwrap_or(false)
                } else {
                    thread.join().is_ok()
                };
                if !joined {
                    tracing::warn!("cache reaper thread exited abnormally");
                }
            }
            None => {}
        }
    }
}

/// Runs `reaping` on a new thread with its own single-threaded runtime
///
/// Failing to start the thread or runtime leaves the cache without a reaper
/// rather than failing construction.
fn spawn_reaper_thread(reaping: impl std::future::Future<Output = ()> + Send + 'static) -> Option<ReaperTask> {
    let spawned = thread::Builder::new().name("cache-reaper".to_string()).spawn(move || {
        match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime.block_on(reaping),
            Err(err) => tracing::error!(error = %err, "failed to build cache reaper runtime"),
        }
    });

    match spawned {
        Ok(thread) => Some(ReaperTask::Thread(thread)),
        Err(err) => {
            tracing::error!(error = %err, "failed to start cache reaper thread");
            None
        }
    }
}

/// Removes expired entries every `period` until shutdown is signalled
async fn reap_loop(entries: EntryMap, ttl: Duration, period: Duration, mut shutdown_rx: mpsc::Receiver<()>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first tick (immediate)
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = reap_expired(&entries, ttl, Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, "reaped expired cache entries");
                } else {
                    tracing::trace!("reaper pass found nothing to remove");
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    tracing::debug!("cache reaper stopped");
}

/// Removes every entry whose age at `now` is at least `ttl`
///
/// The scan and removal happen as one batch under the map lock, so readers
/// never observe a partially reaped map. Returns the number of entries removed.
pub(crate) fn reap_expired(entries: &Mutex<HashMap<String, Entry>>, ttl: Duration, now: Instant) -> usize {
    let mut entries = entries.lock();
    let before = entries.len();
    entries.retain(|_, entry| now.saturating_duration_since(entry.created_at) < ttl);
    before - entries.len()
}
