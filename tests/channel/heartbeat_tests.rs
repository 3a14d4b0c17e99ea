//! Keepalive pings.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use newsfeed_live::domain::state::{ConnectionState, NotificationKind};

use crate::common::{channel_with, Script, ScriptedConnector};

#[tokio::test(start_paused = true)]
async fn test_pings_every_interval_while_open() {
    let (connector, mut peers) = ScriptedConnector::new([Script::Accept], Script::Refuse);
    let channel = channel_with(Arc::clone(&connector));

    channel.start();
    let mut peer = peers.recv().await.unwrap();
    channel.observer().wait_for(|s| s.connected).await.unwrap();

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(peer.sent_frames().is_empty());

    tokio::time::sleep(Duration::from_secs(66)).await;
    assert_eq!(peer.sent_frames(), vec!["ping", "ping", "ping"]);

    channel.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_pings_after_server_close() {
    let (connector, mut peers) = ScriptedConnector::new([Script::Accept], Script::Refuse);
    let channel = channel_with(Arc::clone(&connector));

    channel.start();
    let mut peer = peers.recv().await.unwrap();
    channel.observer().wait_for(|s| s.connected).await.unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(peer.sent_frames(), vec!["ping"]);

    peer.hang_up();
    channel.observer().wait_for(|s| !s.connected).await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(peer.sent_frames().is_empty());

    channel.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_ping_closes_and_reconnects() {
    let (connector, mut peers) = ScriptedConnector::new([Script::Accept, Script::Accept], Script::Refuse);
    let channel = channel_with(Arc::clone(&connector));
    let mut notifications = channel.observer().notifications();

    channel.start();
    let first = peers.recv().await.unwrap();
    channel.observer().wait_for(|s| s.connected).await.unwrap();
    assert_eq!(notifications.recv().await.unwrap().kind, NotificationKind::Connected);

    first.break_sends();
    let snapshot = channel
        .observer()
        .wait_for(|s| matches!(s.state, ConnectionState::Reconnecting { .. }))
        .await
        .unwrap();
    assert!(!snapshot.connected);
    assert!(first.is_closed());
    assert!(matches!(
        notifications.recv().await.unwrap().kind,
        NotificationKind::Retrying { attempt: 1, .. }
    ));

    let _second = peers.recv().await.unwrap();
    channel.observer().wait_for(|s| s.connected).await.unwrap();
    assert_eq!(connector.attempt_count(), 2);

    channel.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_ping_disconnects_before_close_handshake() {
    let (connector, mut peers) = ScriptedConnector::new([Script::Accept], Script::Refuse);
    let channel = channel_with(Arc::clone(&connector));
    let mut observer = channel.observer();

    channel.start();
    let peer = peers.recv().await.unwrap();
    observer.wait_for(|s| s.connected).await.unwrap();

    peer.break_sends();
    peer.stall_close();
    let started = tokio::time::Instant::now();
    let snapshot = observer
        .wait_for(|s| s.state == ConnectionState::Closing)
        .await
        .unwrap();

    // The handshake is still pending, yet nothing may be sent through it
    assert!(!snapshot.connected);
    assert!(!channel.is_connected());
    assert!(!channel.send("hello"));
    assert!(started.elapsed() < Duration::from_secs(31));

    // The stalled handshake is cut off by the close timeout
    observer
        .wait_for(|s| matches!(s.state, ConnectionState::Reconnecting { .. }))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_secs(31));

    channel.stop().await;
}
