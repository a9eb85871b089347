//! Reply actor for the draft generation and send calls

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::actor::{RetryConfig, with_retry};
use crate::backend::{BackendError, DraftRequest, MailBackend, SendRequest};
use crate::constants::{CHANNEL_CAPACITY, SEND_FAILED_FALLBACK};

/// Identifies the session a remote call was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTicket {
    pub message_id: String,
    pub epoch: u64,
}

/// Commands that can be sent to the reply actor
#[derive(Debug)]
pub enum ReplyCommand {
    Generate {
        ticket: ReplyTicket,
        request: DraftRequest,
    },
    Send {
        ticket: ReplyTicket,
        request: SendRequest,
    },
    /// Abort pending calls and stop the actor
    Shutdown,
}

/// Events emitted by the reply actor
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    Drafted { ticket: ReplyTicket, draft: String },
    DraftFailed { ticket: ReplyTicket, error: String },
    Sent { ticket: ReplyTicket },
    SendFailed { ticket: ReplyTicket, error: String },
}

impl ReplyEvent {
    pub fn ticket(&self) -> &ReplyTicket {
        match self {
            Self::Drafted { ticket, .. }
            | Self::DraftFailed { ticket, .. }
            | Self::Sent { ticket }
            | Self::SendFailed { ticket, .. } => ticket,
        }
    }
}

/// Handle for communicating with the reply actor
pub struct ReplyActorHandle {
    pub cmd_tx: mpsc::Sender<ReplyCommand>,
    pub event_rx: mpsc::Receiver<ReplyEvent>,
}

/// Spawn the reply actor task.
///
/// Calls for different sessions run concurrently; the workflow guarantees at
/// most one call per session.
pub fn spawn_reply_actor<B: MailBackend>(backend: Arc<B>, retry: RetryConfig) -> ReplyActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(reply_actor_loop(backend, retry, cmd_rx, event_tx));

    ReplyActorHandle { cmd_tx, event_rx }
}

async fn reply_actor_loop<B: MailBackend>(
    backend: Arc<B>,
    retry: RetryConfig,
    mut cmd_rx: mpsc::Receiver<ReplyCommand>,
    event_tx: mpsc::Sender<ReplyEvent>,
) {
    let mut calls = JoinSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ReplyCommand::Generate { ticket, request }) => {
                        calls.spawn(generate(
                            Arc::clone(&backend),
                            retry.clone(),
                            ticket,
                            request,
                            event_tx.clone(),
                        ));
                    }
                    Some(ReplyCommand::Send { ticket, request }) => {
                        calls.spawn(send(Arc::clone(&backend), ticket, request, event_tx.clone()));
                    }
                    Some(ReplyCommand::Shutdown) | None => break,
                }
            }
            Some(joined) = calls.join_next(), if !calls.is_empty() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    tracing::error!("Reply call panicked: {}", e);
                }
            }
        }
    }

    calls.abort_all();
    tracing::debug!("Reply actor stopped");
}

async fn generate<B: MailBackend>(
    backend: Arc<B>,
    retry: RetryConfig,
    ticket: ReplyTicket,
    request: DraftRequest,
    event_tx: mpsc::Sender<ReplyEvent>,
) {
    let result = with_retry(&retry, BackendError::is_rate_limited, || {
        backend.generate_reply(request.clone())
    })
    .await;

    let event = match result {
        Ok(draft) => ReplyEvent::Drafted { ticket, draft },
        Err(e) => {
            tracing::warn!("Draft generation for {} failed: {}", ticket.message_id, e);
            ReplyEvent::DraftFailed {
                ticket,
                error: format!("Failed to generate draft: {}", e.user_message()),
            }
        }
    };
    if event_tx.send(event).await.is_err() {
        tracing::warn!("Reply actor: event receiver dropped");
    }
}

async fn send<B: MailBackend>(
    backend: Arc<B>,
    ticket: ReplyTicket,
    request: SendRequest,
    event_tx: mpsc::Sender<ReplyEvent>,
) {
    // Sends are never retried: a timed-out send may still have gone out
    let event = match backend.send_reply(request).await {
        Ok(receipt) if receipt.success => ReplyEvent::Sent { ticket },
        Ok(receipt) => ReplyEvent::SendFailed {
            ticket,
            error: send_error_text(receipt.error.as_deref()),
        },
        Err(e) => {
            tracing::warn!("Send for {} failed: {}", ticket.message_id, e);
            ReplyEvent::SendFailed {
                ticket,
                error: send_error_text(e.backend_message()),
            }
        }
    };
    if event_tx.send(event).await.is_err() {
        tracing::warn!("Reply actor: event receiver dropped");
    }
}

/// The backend's own explanation, or the generic hint when it gave none
fn send_error_text(backend_error: Option<&str>) -> String {
    backend_error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(SEND_FAILED_FALLBACK)
        .to_string()
}
