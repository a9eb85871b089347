//! Mailbox sync engine
//!
//! Owns both mailbox collections and keeps the active view up to date:
//! - explicit syncs, at most one in flight per view
//! - debounced manual refresh
//! - periodic refresh of the active view
//!
//! Listing calls and timers run as spawned tasks that report back through the
//! engine's event channel. Every event carries the identity it was issued for
//! (view generation or timer epoch) and is dropped when that identity is no
//! longer current.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::state::{MailboxState, SyncStatus};
use super::timer::{self, TimerHandle};
use crate::backend::{BackendError, MailBackend};
use crate::config::SyncConfig;
use crate::constants::CHANNEL_CAPACITY;
use crate::mail::{Email, MailView};

/// Events delivered to the engine by its own tasks
#[derive(Debug)]
pub enum SyncEvent {
    Listed {
        view: MailView,
        generation: u64,
        result: Result<Vec<Email>, BackendError>,
    },
    PeriodicTick {
        view: MailView,
        epoch: u64,
    },
    RefreshDue {
        view: MailView,
        epoch: u64,
    },
}

/// What handling an event changed
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A timer started a listing call
    Started { view: MailView },
    /// A listing replaced the view's collection.
    /// `new_emails` lists inbox messages not present in the previous listing.
    Synced {
        view: MailView,
        new_emails: Vec<Email>,
    },
    Failed { view: MailView, error: String },
}

#[derive(Debug, Default)]
struct ViewSlot {
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    /// A successful listing exists and nothing invalidated it since
    fresh: bool,
    /// Re-sync once the in-flight listing completes
    resync_queued: bool,
}

pub struct SyncEngine<B: MailBackend> {
    backend: Arc<B>,
    config: SyncConfig,
    state: MailboxState,
    inbox: ViewSlot,
    sent: ViewSlot,
    periodic: Option<TimerHandle>,
    periodic_epoch: u64,
    debounce: Option<TimerHandle>,
    debounce_epoch: u64,
    /// View whose failure `state.last_error` describes
    error_view: Option<MailView>,
    closed: bool,
    event_tx: mpsc::Sender<SyncEvent>,
    event_rx: mpsc::Receiver<SyncEvent>,
}

impl<B: MailBackend> SyncEngine<B> {
    pub fn new(backend: Arc<B>, config: SyncConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            backend,
            config,
            state: MailboxState::default(),
            inbox: ViewSlot::default(),
            sent: ViewSlot::default(),
            periodic: None,
            periodic_epoch: 0,
            debounce: None,
            debounce_epoch: 0,
            error_view: None,
            closed: false,
            event_tx,
            event_rx,
        }
    }

    /// Activate the initial view: start its periodic timer and sync it.
    pub fn start(&mut self) {
        self.restart_periodic();
        self.request_sync(self.state.active_view);
    }

    pub fn state(&self) -> &MailboxState {
        &self.state
    }

    pub fn active_view(&self) -> MailView {
        self.state.active_view
    }

    fn slot(&self, view: MailView) -> &ViewSlot {
        match view {
            MailView::Inbox => &self.inbox,
            MailView::Sent => &self.sent,
        }
    }

    fn slot_mut(&mut self, view: MailView) -> &mut ViewSlot {
        match view {
            MailView::Inbox => &mut self.inbox,
            MailView::Sent => &mut self.sent,
        }
    }

    pub fn is_in_flight(&self, view: MailView) -> bool {
        self.slot(view).in_flight.is_some()
    }

    /// Start a listing call for `view`.
    ///
    /// Returns false when the engine is shut down or a listing for this view
    /// is already pending.
    pub fn request_sync(&mut self, view: MailView) -> bool {
        if self.closed {
            return false;
        }
        if self.is_in_flight(view) {
            tracing::debug!("Sync for {} already in flight, skipping", view);
            return false;
        }

        let generation = {
            let slot = self.slot_mut(view);
            slot.generation += 1;
            slot.generation
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        let limit = self.config.limit;
        let task = tokio::spawn(async move {
            let result = backend.list(view, limit).await;
            tx.send(SyncEvent::Listed {
                view,
                generation,
                result,
            })
            .await
            .ok();
        });

        self.slot_mut(view).in_flight = Some(task);
        self.state.status = SyncStatus::Loading;
        self.clear_error(view);
        tracing::debug!("Sync {} #{} started", view, generation);
        true
    }

    /// Switch the active view, moving the periodic timer over to it.
    pub fn set_active_view(&mut self, view: MailView) {
        if self.closed || view == self.state.active_view {
            return;
        }

        tracing::debug!("Active view {} -> {}", self.state.active_view, view);
        self.state.active_view = view;
        // A pending manual refresh belonged to the previous view
        self.debounce = None;
        self.restart_periodic();

        if !self.slot(view).fresh {
            self.request_sync(view);
        }
    }

    /// Debounced manual refresh of the active view
    pub fn refresh(&mut self) {
        if self.closed {
            return;
        }

        self.debounce_epoch += 1;
        let event = SyncEvent::RefreshDue {
            view: self.state.active_view,
            epoch: self.debounce_epoch,
        };
        // Replacing the handle aborts the previous countdown
        self.debounce = Some(timer::spawn_delay(
            self.config.debounce(),
            self.event_tx.clone(),
            event,
        ));
    }

    /// A reply went out: both collections are outdated, re-sync the active one.
    pub fn on_reply_sent(&mut self, message_id: &str) {
        if self.closed {
            return;
        }

        let view = self.state.active_view;
        tracing::info!("Reply sent for {}, re-syncing {}", message_id, view);
        self.inbox.fresh = false;
        self.sent.fresh = false;

        if !self.request_sync(view) {
            // The pending listing may predate the send
            self.slot_mut(view).resync_queued = true;
        }
    }

    /// Cancel timers and pending listings; later results are discarded.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }

        tracing::debug!("Sync engine shutting down");
        self.closed = true;
        self.periodic = None;
        self.debounce = None;
        for slot in [&mut self.inbox, &mut self.sent] {
            if let Some(task) = slot.in_flight.take() {
                task.abort();
            }
            slot.resync_queued = false;
        }
        if self.state.status == SyncStatus::Loading {
            self.state.status = if self.state.last_error.is_some() {
                SyncStatus::Error
            } else {
                SyncStatus::Idle
            };
        }
    }

    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.event_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<SyncEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn handle(&mut self, event: SyncEvent) -> Option<SyncOutcome> {
        if self.closed {
            tracing::debug!("Ignoring {:?} after shutdown", event_name(&event));
            return None;
        }

        match event {
            SyncEvent::Listed {
                view,
                generation,
                result,
            } => self.handle_listed(view, generation, result),

            SyncEvent::PeriodicTick { view, epoch } => {
                if epoch != self.periodic_epoch || view != self.state.active_view {
                    tracing::debug!("Ignoring stale periodic tick for {}", view);
                    return None;
                }
                self.request_sync(view)
                    .then_some(SyncOutcome::Started { view })
            }

            SyncEvent::RefreshDue { view, epoch } => {
                if epoch != self.debounce_epoch || view != self.state.active_view {
                    tracing::debug!("Ignoring superseded refresh for {}", view);
                    return None;
                }
                self.debounce = None;
                self.request_sync(view)
                    .then_some(SyncOutcome::Started { view })
            }
        }
    }

    fn handle_listed(
        &mut self,
        view: MailView,
        generation: u64,
        result: Result<Vec<Email>, BackendError>,
    ) -> Option<SyncOutcome> {
        let slot = self.slot_mut(view);
        if generation != slot.generation || slot.in_flight.is_none() {
            tracing::debug!("Discarding stale {} listing #{}", view, generation);
            return None;
        }
        slot.in_flight = None;
        let resync = std::mem::take(&mut slot.resync_queued);

        let outcome = match result {
            Ok(emails) => self.apply_listing(view, emails),
            Err(e) => {
                let error = format!(
                    "Network error fetching {}: {}. Check backend service.",
                    view, e
                );
                tracing::warn!("{}", error);
                self.state.last_error = Some(error.clone());
                self.error_view = Some(view);
                SyncOutcome::Failed { view, error }
            }
        };

        // An error for the other view outlives this success
        self.state.status = if matches!(outcome, SyncOutcome::Failed { .. }) {
            SyncStatus::Error
        } else if self.inbox.in_flight.is_some() || self.sent.in_flight.is_some() {
            SyncStatus::Loading
        } else if self.state.last_error.is_some() {
            SyncStatus::Error
        } else {
            SyncStatus::Idle
        };

        if resync {
            self.request_sync(view);
        }

        Some(outcome)
    }

    fn apply_listing(&mut self, view: MailView, mut emails: Vec<Email>) -> SyncOutcome {
        for email in &mut emails {
            email.kind.get_or_insert(view);
        }

        let new_emails = if view == MailView::Inbox && self.state.synced_at(view).is_some() {
            let known: HashSet<&str> = self
                .state
                .inbox
                .iter()
                .map(|e| e.message_id.as_str())
                .collect();
            emails
                .iter()
                .filter(|e| !known.contains(e.message_id.as_str()))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        tracing::info!(
            "Synced {}: {} emails ({} new)",
            view,
            emails.len(),
            new_emails.len()
        );

        self.state.replace(view, emails);
        self.clear_error(view);
        self.slot_mut(view).fresh = true;

        SyncOutcome::Synced { view, new_emails }
    }

    /// Forget the last error if it came from `view`
    fn clear_error(&mut self, view: MailView) {
        if self.error_view == Some(view) {
            self.error_view = None;
            self.state.last_error = None;
        }
    }

    fn restart_periodic(&mut self) {
        // Drop first so the old timer is gone before the new one exists
        self.periodic = None;
        self.periodic_epoch += 1;

        let view = self.state.active_view;
        let epoch = self.periodic_epoch;
        self.periodic = Some(timer::spawn_interval(
            self.config.refresh_interval(),
            self.event_tx.clone(),
            move || SyncEvent::PeriodicTick { view, epoch },
        ));
    }
}

fn event_name(event: &SyncEvent) -> &'static str {
    match event {
        SyncEvent::Listed { .. } => "listing",
        SyncEvent::PeriodicTick { .. } => "periodic tick",
        SyncEvent::RefreshDue { .. } => "refresh",
    }
}
