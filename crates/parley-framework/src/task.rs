//! Detached background work for deferred responses.
//!
//! A handler that needs more time returns its acknowledgement immediately and
//! hands the slow part to a [`TaskSpawner`]. The spawner tracks every task so
//! the process can wait for them on shutdown. Tasks are never awaited by the
//! router, never retried and cannot be cancelled; failures are logged.

use std::fmt::Display;
use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info_span};

/// Spawns and tracks background tasks.
///
/// Cloning is cheap; all clones share the same tracker.
#[derive(Debug, Clone, Default)]
pub struct TaskSpawner {
    tracker: TaskTracker,
}

impl TaskSpawner {
    /// Creates an empty spawner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `fut` on the current runtime.
    ///
    /// An `Err` returned by the task is logged with the task name.
    pub fn spawn<F, E>(&self, name: impl Into<String>, fut: F) -> BackgroundTask
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let span = info_span!("background_task", task = %name);

        let handle = self.tracker.spawn(
            async move {
                match fut.await {
                    Ok(()) => debug!(task = %task_name, "Background task finished"),
                    Err(e) => error!(task = %task_name, error = %e, "Background task failed"),
                }
            }
            .instrument(span),
        );

        BackgroundTask { name, handle }
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    /// Returns `true` if no task is running.
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Closes the tracker and waits for in-flight tasks.
    pub async fn shutdown(&self) {
        self.tracker.close();
        debug!(pending = self.tracker.len(), "Waiting for background tasks");
        self.tracker.wait().await;
    }
}

/// Handle to a spawned background task.
///
/// Dropping the handle detaches it; the task keeps running. There is no way
/// to abort a task through this handle.
#[derive(Debug)]
pub struct BackgroundTask {
    name: String,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// The name given at spawn time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the task has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task to complete.
    ///
    /// Returns `false` if the task panicked.
    pub async fn wait(self) -> bool {
        match self.handle.await {
            Ok(()) => true,
            Err(e) => {
                error!(task = %self.name, error = %e, "Background task panicked");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_task_runs_and_is_tracked() {
        let spawner = TaskSpawner::new();
        let done = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&done);
        let task = spawner.spawn("increment", async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        });
        assert_eq!(task.name(), "increment");
        assert!(!spawner.is_empty());

        assert!(task.wait().await);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_task_is_contained() {
        let spawner = TaskSpawner::new();
        let task = spawner.spawn("fails", async { Err::<(), _>("boom") });
        assert!(task.wait().await);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_detached_tasks() {
        let spawner = TaskSpawner::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&done);
            // handle dropped immediately
            drop(spawner.spawn("detached", async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(())
            }));
        }

        spawner.clone().shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(spawner.len(), 0);
    }
}
