//! Application shell: terminal input, render snapshots, and the dashboard core

mod actions;
mod event_loop;
pub mod render_thread;
pub mod state;

use anyhow::Result;
use std::sync::Arc;

use render_thread::RenderThread;

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::input::KeyBindings;
use crate::mail::MailView;
use state::{AppState, ReplyView};

pub struct App {
    pub(crate) config: Config,
    pub(crate) dashboard: Dashboard<HttpBackend>,
    pub(crate) state: AppState,
    pub(crate) bindings: KeyBindings,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let dashboard = Dashboard::new(backend, &config);

        let state = AppState {
            preview_length: config.ui.preview_length,
            backend_url: config.backend.url.clone(),
            ..Default::default()
        };

        Ok(Self {
            config,
            dashboard,
            state,
            bindings: KeyBindings::new(),
            dirty: true, // Start dirty for initial render
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        self.state.set_status(format!("Connecting to {}...", self.config.backend.url));
        self.dashboard.start();
        self.refresh_snapshot();

        let result = self.event_loop(&render_thread).await;

        // Shutdown render thread (handles terminal cleanup)
        render_thread.shutdown();

        // Stop timers and abort outstanding backend calls
        self.dashboard.shutdown();

        result
    }

    /// Copy what the UI shows out of the dashboard core
    pub(crate) fn refresh_snapshot(&mut self) {
        let mailbox = self.dashboard.mailbox();
        let view = mailbox.active_view;

        self.state.view = view;
        self.state.inbox_count = mailbox.inbox.len();
        self.state.sent_count = mailbox.sent.len();
        self.state.status.loading = mailbox.is_loading();
        self.state.last_sync = mailbox.synced_at(view);
        self.state.eligible = mailbox
            .current()
            .iter()
            .filter(|email| self.dashboard.is_eligible(email))
            .map(|email| email.message_id.clone())
            .collect();

        self.state.groups = self.dashboard.groups();
        self.state.stats = (view == MailView::Inbox).then(|| self.dashboard.stats());
        self.state.reply = self.dashboard.reply().map(ReplyView::from);
        self.state.clamp_selection();
    }
}
