//! Per-key deduplication of concurrent generation work.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures_util::future::{BoxFuture, FutureExt as _, Shared};

use crate::foundation::error::{BackdropError, BackdropResult};

/// Handle every caller awaits for one in-flight job.
pub type SharedJob<T> = Shared<BoxFuture<'static, BackdropResult<T>>>;

type JobMap<K, T> = Arc<Mutex<HashMap<K, SharedJob<T>>>>;

/// Registry of jobs currently running, one per key.
///
/// The first caller for a key spawns the job on the Tokio runtime; later
/// callers receive a clone of the same [`SharedJob`]. Because the work is
/// spawned rather than polled by the caller, it runs to completion even if
/// every caller goes away, and all waiters see the same result.
pub struct InFlight<K, T> {
    jobs: JobMap<K, T>,
}

impl<K, T> Default for InFlight<K, T> {
    fn default() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, T> InFlight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the job for `key`, starting `start()` if none is running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn join_or_start<F, Fut>(&self, key: K, start: F) -> SharedJob<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BackdropResult<T>> + Send + 'static,
    {
        let mut jobs = lock(&self.jobs);
        if let Some(job) = jobs.get(&key) {
            return job.clone();
        }

        let work = start();
        let registry = Arc::clone(&self.jobs);
        let done_key = key.clone();
        // The registry lock is held until the job is inserted, so the removal
        // below can never run before the insert.
        let handle = tokio::spawn(async move {
            let out = work.await;
            lock(&registry).remove(&done_key);
            out
        });

        let job = async move {
            handle.await.unwrap_or_else(|e| {
                Err(BackdropError::from(anyhow::anyhow!(
                    "generation task failed: {e}"
                )))
            })
        }
        .boxed()
        .shared();
        jobs.insert(key, job.clone());
        job
    }

    /// Number of jobs currently running.
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    /// `true` when no job is running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<K, T>(jobs: &Mutex<HashMap<K, SharedJob<T>>>) -> MutexGuard<'_, HashMap<K, SharedJob<T>>> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "../../tests/unit/service/inflight.rs"]
mod tests;
