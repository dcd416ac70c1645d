use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A scheduled continuation owned by exactly one desk.
///
/// The task runs under a child of the application shutdown token. Cancelling
/// it (or dropping the handle) wakes every pending `pause`, so no stage fires
/// against a desk that has moved on.
#[derive(Debug)]
pub(crate) struct StagedTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl StagedTask {
    pub(crate) fn spawn<F, Fut>(parent: &CancellationToken, stage: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = parent.child_token();
        let handle = tokio::spawn(stage(token.clone()));
        Self { token, handle }
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StagedTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Sleeps for `duration` unless cancelled first. Returns `false` on
/// cancellation.
pub(crate) async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    fn flagging_task(parent: &CancellationToken, delay: Duration) -> (StagedTask, Arc<AtomicBool>) {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = StagedTask::spawn(parent, move |token| async move {
            if pause(&token, delay).await {
                flag.store(true, Ordering::SeqCst);
            }
        });
        (task, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn pause_completes_when_not_cancelled() {
        let root = CancellationToken::new();
        let (task, fired) = flagging_task(&root, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(fired.load(Ordering::SeqCst));
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_stage_from_firing() {
        let root = CancellationToken::new();
        let (task, fired) = flagging_task(&root, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(1)).await;
        task.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!fired.load(Ordering::SeqCst));
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let root = CancellationToken::new();
        let (task, fired) = flagging_task(&root, Duration::from_secs(5));

        drop(task);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_children() {
        let root = CancellationToken::new();
        let (_first, first_fired) = flagging_task(&root, Duration::from_secs(5));
        let (_second, second_fired) = flagging_task(&root, Duration::from_secs(8));

        root.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!first_fired.load(Ordering::SeqCst));
        assert!(!second_fired.load(Ordering::SeqCst));
    }
}
