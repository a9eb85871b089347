//! Main event loop and dashboard update processing

use anyhow::Result;
use crossterm::event;
use std::time::Duration;

use crate::dashboard::DashboardUpdate;
use crate::input::{InputResult, handle_input};
use crate::reply::ReplyOutcome;
use crate::sync::SyncOutcome;

use super::App;
use super::render_thread::RenderThread;

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        loop {
            // Apply finished background work FIRST (non-blocking)
            if self.process_dashboard_updates() {
                self.dirty = true;
            }

            // Clear expired errors
            if self.state.clear_error_if_expired() {
                self.dirty = true;
            }

            // Keep the spinner moving while a listing is in flight
            if self.state.status.loading {
                self.dirty = true;
            }

            // Render only when dirty (non-blocking - sends to render thread)
            if self.dirty {
                render_thread.render(self.state.clone());
                self.dirty = false;
            }

            // Handle input (adaptive timeout: faster when loading)
            let poll_timeout = if self.state.status.loading { 50 } else { 150 };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.acknowledge_error();
                        self.handle_action(action);
                    }
                    InputResult::Char(c) => {
                        self.state.acknowledge_error();
                        self.handle_char(c);
                    }
                    InputResult::Backspace => {
                        self.state.acknowledge_error();
                        self.handle_backspace();
                    }
                    InputResult::Continue => {}
                }
                self.refresh_snapshot();
            }

            // Give spawned backend calls a chance to run
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Apply every ready dashboard update. Returns true if anything changed.
    pub(crate) fn process_dashboard_updates(&mut self) -> bool {
        let updates = self.dashboard.pump();
        if updates.is_empty() {
            return false;
        }

        for update in updates {
            tracing::debug!("Dashboard update: {:?}", update);
            match update {
                DashboardUpdate::Sync(outcome) => self.handle_sync_outcome(outcome),
                DashboardUpdate::Reply(outcome) => self.handle_reply_outcome(outcome),
            }
        }

        self.refresh_snapshot();
        true
    }

    fn handle_sync_outcome(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Started { view } => {
                self.state.set_status(format!("Syncing {}...", view));
            }
            SyncOutcome::Synced { view, new_emails } => {
                let count = self.dashboard.mailbox().emails(view).len();
                if new_emails.is_empty() {
                    self.state.set_status(format!("{}: {} emails", view.title(), count));
                } else {
                    tracing::info!("{} new inbox emails", new_emails.len());
                    self.state
                        .set_status(format!("{} new emails", new_emails.len()));

                    #[cfg(feature = "notifications")]
                    crate::notification::notify_new_mail(&self.config.notifications, &new_emails);
                }
            }
            SyncOutcome::Failed { error, .. } => {
                self.state.set_error(error);
            }
        }
    }

    fn handle_reply_outcome(&mut self, outcome: ReplyOutcome) {
        match outcome {
            ReplyOutcome::Drafted { .. } => {
                self.state.set_status("Draft ready - edit, then Ctrl-S to send");
            }
            ReplyOutcome::DraftFailed { error, .. } => {
                self.state.set_error(error);
            }
            ReplyOutcome::Sent { session } => {
                self.state
                    .set_status(format!("Reply sent to {}", session.email.display_from()));
            }
            ReplyOutcome::SendFailed { error, .. } => {
                self.state.set_error(error);
            }
        }
    }
}
