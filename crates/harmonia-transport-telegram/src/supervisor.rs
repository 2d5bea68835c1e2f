//! Supervised background tasks.
//!
//! Each task gets its own child [`CancellationToken`]; a task that fails is
//! restarted after a fixed delay, a task that returns `Ok` is done. On
//! cancellation a running task gets [`SHUTDOWN_GRACE`] to wind down before it
//! is dropped.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Delay before a failed task is started again.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);
/// How long a cancelled task may keep running before it is dropped.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Spawn `factory` as a supervised task named `name`.
///
/// The task runs until `factory` returns `Ok` or `cancel` fires. Each attempt
/// receives a fresh child token of `cancel`.
pub fn spawn_supervised<F, Fut>(
    name: &'static str,
    cancel: CancellationToken,
    restart_delay: Duration,
    factory: F,
) -> JoinHandle<()>
where
    F: Fn(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            info!("Starting task '{name}' (attempt {attempt})");

            let run = factory(cancel.child_token());
            tokio::pin!(run);
            let outcome = tokio::select! {
                res = &mut run => Some(res),
                () = cancel.cancelled() => None,
            };

            match outcome {
                None => {
                    match tokio::time::timeout(SHUTDOWN_GRACE, run).await {
                        Ok(Err(e)) => warn!("Task '{name}' failed while stopping: {e:#}"),
                        Ok(Ok(())) => {}
                        Err(_) => warn!("Task '{name}' did not stop within grace period"),
                    }
                    info!("Task '{name}' cancelled");
                    return;
                }
                Some(Ok(())) => {
                    info!("Task '{name}' finished");
                    return;
                }
                Some(Err(e)) => {
                    error!("Task '{name}' failed: {e:#}");
                }
            }

            warn!("Restarting task '{name}' in {}ms", restart_delay.as_millis());
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Task '{name}' cancelled before restart");
                    return;
                }
                () = tokio::time::sleep(restart_delay) => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failed_task_is_restarted_until_ok() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let handle = spawn_supervised(
            "flaky",
            CancellationToken::new(),
            Duration::from_millis(1),
            move |_| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        anyhow::bail!("transient");
                    }
                    Ok(())
                }
            },
        );

        assert!(handle.await.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancel_stops_running_task() {
        let cancel = CancellationToken::new();
        let handle = spawn_supervised(
            "forever",
            cancel.clone(),
            Duration::from_millis(1),
            |token| async move {
                token.cancelled().await;
                anyhow::bail!("should not be restarted")
            },
        );

        cancel.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_cancel_during_restart_delay() {
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let handle = spawn_supervised(
            "always-failing",
            cancel.clone(),
            Duration::from_secs(3600),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { anyhow::bail!("down") }
            },
        );

        while attempts.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
