//! Desktop notification support for new inbox mail

use crate::config::NotificationConfig;
use crate::mail::Email;

/// Longest subject shown in a notification body
const MAX_SUBJECT_CHARS: usize = 100;

/// Send a desktop notification for emails that appeared since the last sync
pub fn notify_new_mail(config: &NotificationConfig, new_emails: &[Email]) {
    if !config.enabled || new_emails.is_empty() {
        return;
    }

    let (summary, body) = notification_text(config, new_emails);

    // Fire and forget
    if let Err(e) = send_notification(&summary, body.as_deref()) {
        tracing::warn!("Failed to send desktop notification: {}", e);
    }
}

/// Summary line and optional body for a batch of new emails
fn notification_text(config: &NotificationConfig, new_emails: &[Email]) -> (String, Option<String>) {
    let summary = match new_emails {
        [only] => format!("New mail from {}", only.display_from()),
        _ => format!("{} new emails", new_emails.len()),
    };

    let body = if config.show_preview {
        new_emails
            .first()
            .map(|email| truncate_subject(email.display_subject()))
    } else {
        None
    };

    (summary, body)
}

fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() > MAX_SUBJECT_CHARS {
        let cut: String = subject.chars().take(MAX_SUBJECT_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        subject.to_string()
    }
}

/// Low-level notification sending
fn send_notification(summary: &str, body: Option<&str>) -> Result<(), notify_rust::error::Error> {
    use notify_rust::Notification;

    let mut notification = Notification::new();
    notification
        .summary(summary)
        .appname("sift")
        .timeout(notify_rust::Timeout::Milliseconds(5000));

    if let Some(body) = body {
        notification.body(body);
    }

    notification.icon("mail-unread");

    notification.show()?;
    Ok(())
}
