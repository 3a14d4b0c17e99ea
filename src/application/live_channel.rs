//! Live Update Channel
//!
//! The service every view shares for push updates. It owns at most one
//! connection task; views read its broadcast state through a
//! [`ChannelObserver`] and never open a transport of their own.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use super::connection::{Command, ConnectionTask};
use crate::domain::backoff::ReconnectPolicy;
use crate::domain::state::{ChannelSnapshot, ConnectionState, Notification, ReceivedMessage};
use crate::domain::transport::Connector;

const NOTIFICATION_CAPACITY: usize = 64;

/// Connection parameters for a [`LiveChannel`].
#[derive(Debug, Clone)]
pub struct LiveChannelConfig {
    pub url: String,
    pub policy: ReconnectPolicy,
    pub heartbeat_interval: Duration,
    pub close_timeout: Duration,
}

impl LiveChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ReconnectPolicy::default(),
            heartbeat_interval: Duration::from_secs(30),
            close_timeout: Duration::from_secs(1),
        }
    }
}

struct Running {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

/// Self-healing live update channel.
pub struct LiveChannel {
    connector: Arc<dyn Connector>,
    config: LiveChannelConfig,
    state: Arc<watch::Sender<ChannelSnapshot>>,
    notifications: broadcast::Sender<Notification>,
    running: Mutex<Option<Running>>,
}

impl LiveChannel {
    pub fn new(connector: Arc<dyn Connector>, config: LiveChannelConfig) -> Self {
        let (state, _) = watch::channel(ChannelSnapshot::idle());
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            connector,
            config,
            state: Arc::new(state),
            notifications,
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &LiveChannelConfig {
        &self.config
    }

    /// Begin connecting. Does nothing if a session is already connecting,
    /// open or waiting to retry; returns whether a new session started.
    ///
    /// A session that gave up after exhausting its retries has ended, so
    /// calling this again starts over with a fresh retry budget.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.task.is_finished()) {
            tracing::debug!("Live channel already running");
            return false;
        }

        let (commands, rx) = mpsc::unbounded_channel();
        let task = ConnectionTask {
            connector: Arc::clone(&self.connector),
            url: self.config.url.clone(),
            policy: self.config.policy,
            heartbeat_interval: self.config.heartbeat_interval,
            close_timeout: self.config.close_timeout,
            commands: rx,
            state: Arc::clone(&self.state),
            notifications: self.notifications.clone(),
            attempts: 0,
        };

        self.state.send_modify(|s| {
            s.state = ConnectionState::Connecting;
            s.connected = false;
        });
        *running = Some(Running {
            commands,
            task: tokio::spawn(task.run()),
        });
        true
    }

    /// Close the transport and cancel both timers. Returns once the
    /// connection task has finished.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        let _ = running.commands.send(Command::Shutdown);
        if let Err(e) = running.task.await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "Live channel task panicked");
            }
        }

        self.state.send_modify(|s| {
            s.state = ConnectionState::Idle;
            s.connected = false;
        });
    }

    /// Serialize `message` and transmit it if connected.
    ///
    /// At most once and best effort: while disconnected the message is
    /// dropped without error. The result only says whether it was handed
    /// to the connection.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> bool {
        if !self.is_connected() {
            tracing::debug!("Live channel disconnected, dropping outbound message");
            return false;
        }

        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize outbound message");
                return false;
            }
        };

        match self.running.lock().as_ref() {
            Some(running) => running.commands.send(Command::Send(text)).is_ok(),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        self.state.borrow().clone()
    }

    /// Read-only view for consumers.
    pub fn observer(&self) -> ChannelObserver {
        ChannelObserver {
            state: self.state.subscribe(),
            notifications: self.notifications.clone(),
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.task.abort();
        }
    }
}

/// Consumer handle onto the channel's broadcast state.
///
/// Poll with [`snapshot`](Self::snapshot) or await
/// [`changed`](Self::changed); notifications are a separate stream.
#[derive(Clone)]
pub struct ChannelObserver {
    state: watch::Receiver<ChannelSnapshot>,
    notifications: broadcast::Sender<Notification>,
}

impl ChannelObserver {
    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().state
    }

    pub fn latest_message(&self) -> Option<Arc<ReceivedMessage>> {
        self.state.borrow().latest_message.clone()
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        self.state.borrow().clone()
    }

    /// Wait for the next state change and return the new snapshot.
    /// `None` once the channel has been dropped.
    pub async fn changed(&mut self) -> Option<ChannelSnapshot> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Wait until `predicate` holds for the current snapshot.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&ChannelSnapshot) -> bool,
    ) -> Option<ChannelSnapshot> {
        self.state.wait_for(predicate).await.ok().map(|s| s.clone())
    }

    /// Whether the state changed since it was last seen through this handle.
    pub fn has_changed(&self) -> bool {
        self.state.has_changed().unwrap_or(false)
    }

    /// Mark the current state as seen.
    pub fn mark_seen(&mut self) {
        self.state.borrow_and_update();
    }

    /// Subscribe to notifications sent from now on.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}
