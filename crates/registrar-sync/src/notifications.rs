//! Notification center and background poller
//!
//! State lives in a `tokio::sync::watch` channel so views observe changes
//! without polling the center themselves. Only `is_read` is ever changed
//! locally; everything else comes from the backend.

use crate::backend::NotificationBackend;
use parking_lot::Mutex;
use registrar_model::{ApiError, MarkReadTarget, Notification};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What the notification bell and panel show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub items: Vec<Notification>,
    pub unread_count: u64,
    pub panel_open: bool,
}

/// Notification state for one session
pub struct NotificationCenter {
    backend: Arc<dyn NotificationBackend>,
    state: watch::Sender<NotificationState>,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        Self { backend, state }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn unread_count(&self) -> u64 {
        self.state.borrow().unread_count
    }

    #[must_use]
    pub fn is_panel_open(&self) -> bool {
        self.state.borrow().panel_open
    }

    /// Receiver that wakes on every state change
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    /// Load the feed, replacing items and count
    ///
    /// # Errors
    /// Returns the backend error after resetting the unread count to 0.
    pub async fn fetch(&self) -> Result<(), ApiError> {
        match self.backend.notifications().await {
            Ok(feed) => {
                self.state.send_if_modified(|state| {
                    let changed = state.items != feed.notifications || state.unread_count != feed.unread_count;
                    state.items = feed.notifications;
                    state.unread_count = feed.unread_count;
                    changed
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "notification fetch failed");
                self.state.send_if_modified(|state| {
                    let changed = state.unread_count != 0;
                    state.unread_count = 0;
                    changed
                });
                Err(err)
            }
        }
    }

    /// Open the panel and reload the list
    ///
    /// # Errors
    /// As [`NotificationCenter::fetch`]; the panel stays open.
    pub async fn open_panel(&self) -> Result<(), ApiError> {
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.panel_open, true));
        self.fetch().await
    }

    pub fn close_panel(&self) {
        self.state.send_if_modified(|state| std::mem::replace(&mut state.panel_open, false));
    }

    /// Mark one notification read; returns its link for navigation
    ///
    /// An already-read item makes no backend call.
    ///
    /// # Errors
    /// Backend error; local state is left as it was.
    pub async fn mark_read(&self, id: u64) -> Result<Option<String>, ApiError> {
        let (already_read, link) = {
            let state = self.state.borrow();
            let item = state.items.iter().find(|n| n.id == id);
            (
                item.is_some_and(|n| n.is_read),
                item.and_then(|n| n.link.clone()),
            )
        };
        if already_read {
            return Ok(link);
        }

        let unread_count = self.backend.mark_read(MarkReadTarget::Ids(vec![id])).await?;
        tracing::debug!(notification_id = id, unread_count, "notification marked read");
        self.state.send_modify(|state| {
            if let Some(item) = state.items.iter_mut().find(|n| n.id == id) {
                item.is_read = true;
            }
            state.unread_count = unread_count;
        });
        Ok(link)
    }

    /// Mark everything read; a no-op when nothing is unread
    ///
    /// # Errors
    /// Backend error; local state is left as it was.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        if self.unread_count() == 0 {
            return Ok(());
        }
        let unread_count = self.backend.mark_read(MarkReadTarget::All).await?;
        tracing::debug!(unread_count, "all notifications marked read");
        self.state.send_modify(|state| {
            for item in &mut state.items {
                item.is_read = true;
            }
            state.unread_count = unread_count;
        });
        Ok(())
    }

    /// One poll: update the count when it changed and the list only while
    /// the panel is open. Failures are logged and ignored.
    pub async fn poll_once(&self) {
        let feed = match self.backend.notifications().await {
            Ok(feed) => feed,
            Err(err) => {
                tracing::warn!(error = %err, "notification poll failed");
                return;
            }
        };
        self.state.send_if_modified(|state| {
            let mut changed = false;
            if state.unread_count != feed.unread_count {
                state.unread_count = feed.unread_count;
                changed = true;
            }
            if state.panel_open && state.items != feed.notifications {
                state.items = feed.notifications;
                changed = true;
            }
            changed
        });
    }
}

struct PollTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Fixed-interval notification poll with an explicit start/stop lifecycle
pub struct NotificationPoller {
    center: Arc<NotificationCenter>,
    task: Mutex<Option<PollTask>>,
}

impl std::fmt::Debug for NotificationPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPoller")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NotificationPoller {
    #[must_use]
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self {
            center,
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Start polling every `interval`, the first poll immediately
    ///
    /// A running poll is stopped first. Must be called inside a tokio
    /// runtime.
    pub fn start(&self, interval: Duration) {
        let (shutdown, mut stop) = oneshot::channel();
        let center = Arc::clone(&self.center);
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => center.poll_once().await,
                }
            }
            tracing::debug!("notification poller stopped");
        });

        tracing::info!(interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX), "notification poller started");
        if let Some(previous) = self.task.lock().replace(PollTask { shutdown, handle }) {
            let _ = previous.shutdown.send(());
        }
    }

    /// Stop polling; returns once the task has finished
    pub async fn stop(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.shutdown.send(());
            if let Err(err) = task.handle.await {
                tracing::warn!(error = %err, "notification poller ended abnormally");
            }
        }
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.handle.abort();
        }
    }
}
