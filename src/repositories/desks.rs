use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::config::{PracticeSettings, UploadSettings};
use crate::services::practice_session::PracticeDesk;
use crate::services::seeded_rng;
use crate::services::upload_pipeline::UploadDesk;
use crate::services::usage_history::UsageHistory;
use crate::tasks::staging::StagedTask;

pub(crate) type PracticeDesks = DeskRegistry<PracticeDesk>;
pub(crate) type UploadDesks = DeskRegistry<UploadDesk>;

/// Every user starts with an empty usage history.
pub(crate) fn practice_desks(settings: PracticeSettings) -> PracticeDesks {
    DeskRegistry::new(move |sequence| {
        PracticeDesk::new(UsageHistory::new(), &settings, seeded_rng(settings.rng_seed, sequence))
    })
}

pub(crate) fn upload_desks(settings: UploadSettings) -> UploadDesks {
    DeskRegistry::new(move |sequence| {
        UploadDesk::new(&settings, seeded_rng(settings.rng_seed, sequence))
    })
}

/// A per-user desk plus the continuation currently scheduled against it.
#[derive(Debug)]
pub(crate) struct DeskSlot<D> {
    pub(crate) desk: D,
    pending: Option<StagedTask>,
}

impl<D> DeskSlot<D> {
    /// Installs `task` as the only pending continuation, cancelling any
    /// previous one.
    pub(crate) fn schedule(&mut self, task: StagedTask) {
        if let Some(previous) = self.pending.replace(task) {
            previous.cancel();
        }
    }

    pub(crate) fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.cancel();
                was_running
            }
            None => false,
        }
    }
}

type DeskFactory<D> = dyn Fn(u64) -> D + Send + Sync;

/// In-memory registry of desks keyed by user id. Each user owns their desk
/// exclusively; all access goes through one async mutex.
pub(crate) struct DeskRegistry<D> {
    slots: Arc<Mutex<HashMap<String, DeskSlot<D>>>>,
    factory: Arc<DeskFactory<D>>,
    created: Arc<AtomicU64>,
}

impl<D> Clone for DeskRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            factory: self.factory.clone(),
            created: self.created.clone(),
        }
    }
}

impl<D> DeskRegistry<D> {
    /// `factory` receives a per-registry sequence number, used to derive a
    /// distinct random stream for each desk.
    pub(crate) fn new<F>(factory: F) -> Self
    where
        F: Fn(u64) -> D + Send + Sync + 'static,
    {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            factory: Arc::new(factory),
            created: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs `f` on the user's slot, creating the desk on first use.
    pub(crate) async fn with_slot<T>(&self, user_id: &str, f: impl FnOnce(&mut DeskSlot<D>) -> T) -> T {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(user_id.to_string()).or_insert_with(|| {
            let sequence = self.created.fetch_add(1, Ordering::Relaxed);
            DeskSlot { desk: (self.factory)(sequence), pending: None }
        });
        f(slot)
    }

    /// Runs `f` only if the user already has a desk.
    pub(crate) async fn with_existing<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut DeskSlot<D>) -> T,
    ) -> Option<T> {
        let mut slots = self.slots.lock().await;
        slots.get_mut(user_id).map(f)
    }

    pub(crate) async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test]
    async fn desks_are_created_lazily_per_user() {
        let registry = DeskRegistry::new(|sequence| sequence);

        assert_eq!(registry.with_existing("alice", |slot| slot.desk).await, None);
        assert_eq!(registry.with_slot("alice", |slot| slot.desk).await, 0);
        assert_eq!(registry.with_slot("bob", |slot| slot.desk).await, 1);
        assert_eq!(registry.with_slot("alice", |slot| slot.desk).await, 0);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduling_replaces_and_cancels_previous_task() {
        let registry = DeskRegistry::new(|_| ());
        let root = CancellationToken::new();

        let first = StagedTask::spawn(&root, |token| async move { token.cancelled().await });
        let second = StagedTask::spawn(&root, |token| async move { token.cancelled().await });

        registry.with_slot("alice", |slot| slot.schedule(first)).await;
        registry.with_slot("alice", |slot| slot.schedule(second)).await;
        tokio::task::yield_now().await;

        assert!(registry.with_slot("alice", |slot| slot.cancel_pending()).await);
        assert!(!registry.with_slot("alice", |slot| slot.cancel_pending()).await);
    }
}
