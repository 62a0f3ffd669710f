//! Background scheduler driving the sync engine.
//!
//! One spawned task owns all timing: the initial load when the session
//! becomes authenticated, the periodic reload while the queue is empty, and
//! the short-delay drain armed whenever the queue size changes. The engine's
//! shared guard keeps a reload and a drain from ever overlapping.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::api::RemoteApi;

use super::engine::SyncEngine;

/// Handle to a running scheduler loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the background loop immediately.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    /// Wait for the loop to finish; it ends on its own when the session
    /// publisher goes away.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Spawns and owns the synchronization loop.
pub struct SyncScheduler;

impl SyncScheduler {
    /// Start the loop on the current runtime.
    pub fn spawn<A: RemoteApi + 'static>(engine: Arc<SyncEngine<A>>) -> SchedulerHandle {
        SchedulerHandle {
            task: tokio::spawn(run(engine)),
        }
    }
}

async fn run<A: RemoteApi + 'static>(engine: Arc<SyncEngine<A>>) {
    let mut session = engine.session_watch();
    let mut queue = engine.queue_watch();

    loop {
        // Everything is gated on the session signal.
        while !session.borrow_and_update().is_authenticated() {
            if session.changed().await.is_err() {
                tracing::debug!("session publisher dropped; scheduler exiting");
                return;
            }
        }

        if !engine.has_loaded_once().await {
            if let Err(error) = engine.load(true).await {
                tracing::warn!(%error, "initial load failed");
            }
        }

        let settings = engine.settings().clone();
        let mut reload = time::interval_at(
            Instant::now() + settings.reload_interval,
            settings.reload_interval,
        );
        reload.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut drain_at = if *queue.borrow_and_update() > 0 {
            Some(Instant::now() + settings.drain_delay)
        } else {
            None
        };

        // One signed-in stretch; broken by sign-out.
        loop {
            let drain_deadline = drain_at;
            let drain_timer = async move {
                match drain_deadline {
                    Some(deadline) => time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = reload.tick() => {
                    if engine.pending_changes().await == 0 {
                        if let Err(error) = engine.load(false).await {
                            tracing::warn!(%error, "background reload failed");
                        }
                    } else {
                        tracing::debug!("reload skipped: pending changes queued");
                    }
                }
                changed = queue.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Re-arm on every size change; disarm once empty.
                    drain_at = if *queue.borrow_and_update() > 0 {
                        Some(Instant::now() + settings.drain_delay)
                    } else {
                        None
                    };
                }
                () = drain_timer => {
                    drain_at = None;
                    let report = engine.drain_pending().await;
                    tracing::debug!(
                        delivered = report.delivered,
                        requeued = report.requeued,
                        abandoned = report.abandoned,
                        "drain pass finished"
                    );
                }
                changed = session.changed() => {
                    if changed.is_err() {
                        tracing::debug!("session publisher dropped; scheduler exiting");
                        return;
                    }
                    if !session.borrow().is_authenticated() {
                        engine.reset().await;
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::api::{Session, SessionHandle};
    use crate::config::SyncSettings;
    use crate::models::{ChangeAction, ChangeDraft, EntityKind, Task};

    use super::super::testing::MockApi;
    use super::*;

    fn fast_settings() -> SyncSettings {
        SyncSettings::default()
            .with_reload_interval(Duration::from_millis(25))
            .with_drain_delay(Duration::from_millis(15))
            .with_fetch_timeouts(Duration::from_secs(1), Duration::from_secs(1))
    }

    fn test_session() -> Session {
        Session {
            email: "tester@example.com".to_string(),
            access_token: "token".to_string(),
        }
    }

    fn spawn_engine(api: &Arc<MockApi>, handle: &SessionHandle) -> Arc<SyncEngine<MockApi>> {
        Arc::new(SyncEngine::new(
            api.clone(),
            handle.subscribe(),
            fast_settings(),
        ))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn initial_load_runs_when_the_session_authenticates() {
        let api = Arc::new(MockApi::new());
        api.seed_task(Task::new("seeded"));
        let handle = SessionHandle::new();
        let engine = spawn_engine(&api, &handle);
        let scheduler = SyncScheduler::spawn(engine.clone());

        sleep(Duration::from_millis(30)).await;
        assert!(!engine.has_loaded_once().await);
        assert_eq!(api.call_count("fetch_tasks"), 0);

        handle.sign_in(test_session());
        sleep(Duration::from_millis(50)).await;

        assert!(engine.has_loaded_once().await);
        assert_eq!(engine.tasks().await.len(), 1);
        scheduler.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn background_reload_picks_up_remote_changes() {
        let api = Arc::new(MockApi::new());
        let handle = SessionHandle::new();
        handle.sign_in(test_session());
        let engine = spawn_engine(&api, &handle);
        let scheduler = SyncScheduler::spawn(engine.clone());

        sleep(Duration::from_millis(20)).await;
        assert!(engine.has_loaded_once().await);
        assert!(engine.tasks().await.is_empty());

        api.seed_task(Task::new("appeared later"));
        sleep(Duration::from_millis(80)).await;

        assert_eq!(engine.tasks().await.len(), 1);
        assert!(api.call_count("fetch_tasks") >= 2);
        scheduler.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queued_changes_drain_after_the_short_delay() {
        let api = Arc::new(MockApi::new());
        let handle = SessionHandle::new();
        handle.sign_in(test_session());
        let engine = spawn_engine(&api, &handle);
        let scheduler = SyncScheduler::spawn(engine.clone());

        sleep(Duration::from_millis(20)).await;
        let task = Task::new("queued offline");
        engine
            .queue_change(ChangeDraft {
                entity: EntityKind::Task,
                action: ChangeAction::Create,
                id: task.id.as_uuid(),
                data: Some(serde_json::to_value(&task).unwrap()),
            })
            .await;
        assert_eq!(engine.pending_changes().await, 1);

        sleep(Duration::from_millis(60)).await;
        assert_eq!(engine.pending_changes().await, 0);
        assert_eq!(api.call_count("create_task"), 1);
        scheduler.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_out_discards_session_state() {
        let api = Arc::new(MockApi::new());
        api.seed_task(Task::new("ephemeral"));
        let handle = SessionHandle::new();
        handle.sign_in(test_session());
        let engine = spawn_engine(&api, &handle);
        let scheduler = SyncScheduler::spawn(engine.clone());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.tasks().await.len(), 1);

        handle.sign_out();
        sleep(Duration::from_millis(20)).await;

        assert!(engine.tasks().await.is_empty());
        assert!(!engine.has_loaded_once().await);
        scheduler.shutdown();
    }
}
