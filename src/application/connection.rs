//! Connection task
//!
//! One task owns the transport, the heartbeat interval and the reconnect
//! timer. Everything that touches the connection goes through its
//! `select!` loop, so frames are handled in delivery order and no timer
//! can outlive the transport it belongs to.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::domain::backoff::ReconnectPolicy;
use crate::domain::message::{decode_frame, InboundFrame, HEARTBEAT_REQUEST};
use crate::domain::state::{ChannelSnapshot, ConnectionState, Notification, ReceivedMessage};
use crate::domain::transport::{Connector, Transport};
use crate::infrastructure::metrics;

/// Requests from the channel handle to its task.
#[derive(Debug)]
pub(crate) enum Command {
    Send(String),
    Shutdown,
}

/// How an open session ended.
enum SessionEnd {
    Closed,
    Shutdown,
}

pub(crate) struct ConnectionTask {
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) url: String,
    pub(crate) policy: ReconnectPolicy,
    pub(crate) heartbeat_interval: Duration,
    pub(crate) close_timeout: Duration,
    pub(crate) commands: mpsc::UnboundedReceiver<Command>,
    pub(crate) state: Arc<watch::Sender<ChannelSnapshot>>,
    pub(crate) notifications: broadcast::Sender<Notification>,
    pub(crate) attempts: u32,
}

impl ConnectionTask {
    pub(crate) async fn run(mut self) {
        loop {
            self.set_state(ConnectionState::Connecting);
            let connection_id = Uuid::new_v4();
            tracing::debug!(
                connection_id = %connection_id,
                url = %self.url,
                attempt = self.attempts,
                "Opening live channel"
            );

            let outcome = {
                let connect = self.connector.connect(&self.url);
                tokio::pin!(connect);
                loop {
                    tokio::select! {
                        result = &mut connect => break Some(result),
                        cmd = self.commands.recv() => match cmd {
                            Some(Command::Send(_)) => {
                                tracing::debug!("Dropping outbound message while connecting");
                            }
                            Some(Command::Shutdown) | None => break None,
                        },
                    }
                }
            };

            match outcome {
                None => {
                    self.finish();
                    return;
                }
                Some(Ok(transport)) => {
                    metrics::record_connect_attempt(true);
                    self.attempts = 0;
                    self.state.send_modify(|s| {
                        s.state = ConnectionState::Open;
                        s.connected = true;
                    });
                    metrics::set_connected(true);
                    tracing::info!(connection_id = %connection_id, url = %self.url, "Live channel connected");
                    self.notify(Notification::connected());

                    if let SessionEnd::Shutdown = self.drive(transport, connection_id).await {
                        return;
                    }
                }
                Some(Err(e)) => {
                    metrics::record_connect_attempt(false);
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "Live channel connection failed"
                    );
                }
            }

            // Closed or failed: connectivity is gone before any retry is armed
            self.state.send_modify(|s| {
                s.state = ConnectionState::Idle;
                s.connected = false;
            });
            metrics::set_connected(false);

            if !self.policy.allows_retry(self.attempts) {
                tracing::error!(
                    max_attempts = self.policy.max_attempts,
                    "Max reconnect attempts reached, giving up"
                );
                metrics::RETRIES_EXHAUSTED_TOTAL.inc();
                self.notify(Notification::reconnect_failed());
                self.finish();
                return;
            }

            let delay = self.policy.delay(self.attempts);
            self.attempts += 1;
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.attempts,
                max_attempts = self.policy.max_attempts,
                "Reconnecting live channel"
            );
            metrics::RECONNECTS_SCHEDULED_TOTAL.inc();
            self.notify(Notification::retrying(delay, self.attempts, self.policy.max_attempts));
            self.set_state(ConnectionState::Reconnecting {
                delay,
                attempt: self.attempts,
            });

            if !self.wait(delay).await {
                self.finish();
                return;
            }
        }
    }

    /// Serve an open transport until it closes or a shutdown arrives.
    async fn drive(&mut self, mut transport: Box<dyn Transport>, connection_id: Uuid) -> SessionEnd {
        let mut heartbeat = interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = transport.next_text() => match frame {
                    Some(Ok(text)) => self.handle_frame(&text),
                    Some(Err(e)) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Live channel transport error");
                        return SessionEnd::Closed;
                    }
                    None => {
                        tracing::info!(connection_id = %connection_id, "Live channel closed by server");
                        return SessionEnd::Closed;
                    }
                },

                _ = heartbeat.tick() => {
                    if let Err(e) = transport.send_text(HEARTBEAT_REQUEST.to_string()).await {
                        tracing::warn!(
                            connection_id = %connection_id,
                            error = %e,
                            "Heartbeat failed, closing transport"
                        );
                        self.mark_closing();
                        self.close_transport(transport.as_mut()).await;
                        return SessionEnd::Closed;
                    }
                    metrics::HEARTBEATS_SENT_TOTAL.inc();
                    tracing::trace!(connection_id = %connection_id, "Heartbeat sent");
                }

                cmd = self.commands.recv() => match cmd {
                    // A lost application frame is dropped; the heartbeat and
                    // the read side decide when the transport is dead
                    Some(Command::Send(text)) => {
                        if let Err(e) = transport.send_text(text).await {
                            tracing::warn!(
                                connection_id = %connection_id,
                                error = %e,
                                "Send failed, dropping outbound message"
                            );
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        self.mark_closing();
                        self.close_transport(transport.as_mut()).await;
                        tracing::info!(connection_id = %connection_id, "Live channel stopped");
                        self.finish();
                        return SessionEnd::Shutdown;
                    }
                },
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match decode_frame(text) {
            Ok(InboundFrame::HeartbeatAck) => {
                metrics::record_frame("pong");
                tracing::trace!("Heartbeat acknowledged");
            }
            Ok(InboundFrame::Message(message)) => {
                metrics::record_frame(message.kind());
                tracing::debug!(kind = message.kind(), "Received message");
                let received = Arc::new(ReceivedMessage {
                    message,
                    received_at: Utc::now(),
                });
                self.state.send_modify(|s| s.latest_message = Some(received));
            }
            Err(e) => {
                metrics::record_frame(e.label());
                tracing::warn!(error = %e, len = text.len(), "Discarding unreadable frame");
            }
        }
    }

    /// Sleep out the reconnect delay. Returns false if shut down meanwhile.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Send(_)) => {
                        tracing::debug!("Dropping outbound message while reconnecting");
                    }
                    Some(Command::Shutdown) | None => return false,
                },
            }
        }
    }

    async fn close_transport(&self, transport: &mut dyn Transport) {
        match tokio::time::timeout(self.close_timeout, transport.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "Close handshake failed"),
            Err(_) => tracing::debug!(
                timeout_ms = self.close_timeout.as_millis() as u64,
                "Close handshake timed out"
            ),
        }
    }

    /// Connectivity is gone from the moment a close begins.
    fn mark_closing(&self) {
        self.state.send_modify(|s| {
            s.state = ConnectionState::Closing;
            s.connected = false;
        });
        metrics::set_connected(false);
    }

    fn finish(&self) {
        self.state.send_modify(|s| {
            s.state = ConnectionState::Idle;
            s.connected = false;
        });
        metrics::set_connected(false);
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_modify(|s| s.state = state);
    }

    fn notify(&self, notification: Notification) {
        // No receivers is fine; nobody is watching the notification surface
        let _ = self.notifications.send(notification);
    }
}
