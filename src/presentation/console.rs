//! Console reporter
//!
//! Follows a [`ChannelObserver`] and logs what a dashboard view would
//! show: notifications as they arrive, and a one-line summary each time
//! a new server message lands.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::application::ChannelObserver;
use crate::domain::dashboard::DashboardStats;
use crate::domain::message::ServerMessage;
use crate::domain::state::{Notification, NotificationLevel, ReceivedMessage};

/// Render a notification as a single console line.
pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Success => "OK",
        NotificationLevel::Info => "INFO",
        NotificationLevel::Warning => "WARN",
        NotificationLevel::Error => "ERROR",
    };
    format!("[{}] {}", tag, notification.message)
}

/// One-line summary of a server message.
pub fn summarize_message(message: &ServerMessage) -> String {
    match message {
        ServerMessage::DashboardUpdate(stats) => summarize_stats(stats),
    }
}

pub fn summarize_stats(stats: &DashboardStats) -> String {
    format!(
        "news {} total / {} today, pushed {} today, avg score {:.1}, {} active crawlers",
        stats.total_news, stats.today_news, stats.today_pushed, stats.avg_score, stats.active_crawlers
    )
}

/// Background task logging channel activity.
pub struct ConsoleReporter {
    task: JoinHandle<()>,
}

impl ConsoleReporter {
    pub fn spawn(mut observer: ChannelObserver) -> Self {
        let mut notifications = observer.notifications();
        let task = tokio::spawn(async move {
            let mut last_seen: Option<Arc<ReceivedMessage>> = observer.latest_message();
            let mut notifications_open = true;
            loop {
                tokio::select! {
                    changed = observer.changed() => {
                        let Some(snapshot) = changed else { break };
                        let Some(latest) = snapshot.latest_message else { continue };
                        if last_seen.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &latest)) {
                            continue;
                        }
                        tracing::info!(
                            kind = latest.message.kind(),
                            received_at = %latest.received_at,
                            "{}",
                            summarize_message(&latest.message)
                        );
                        last_seen = Some(latest);
                    }

                    received = notifications.recv(), if notifications_open => match received {
                        Ok(notification) => log_notification(&notification),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "Notification reporter lagged");
                        }
                        Err(RecvError::Closed) => notifications_open = false,
                    },
                }
            }
        });
        Self { task }
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn log_notification(notification: &Notification) {
    let line = render_notification(notification);
    match notification.level {
        NotificationLevel::Error => tracing::error!("{}", line),
        NotificationLevel::Warning => tracing::warn!("{}", line),
        NotificationLevel::Success | NotificationLevel::Info => tracing::info!("{}", line),
    }
}
