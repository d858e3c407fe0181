// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connectivity module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::config::EngineConfig;
use crate::coordinator::SyncCoordinator;
use crate::store::durable::MemoryStore;
use crate::store::remote_tests::FakeRemote;

#[test]
fn test_monitor_starts_with_initial_state() {
    assert!(!ConnectivityMonitor::new(false).is_online());
    assert!(ConnectivityMonitor::new(true).is_online());
    assert!(!ConnectivityMonitor::default().is_online());
}

#[test]
fn test_set_online_flips_state() {
    let monitor = ConnectivityMonitor::new(false);
    monitor.set_online(true);
    assert!(monitor.is_online());
    monitor.set_online(false);
    assert!(!monitor.is_online());
}

#[test]
fn test_duplicate_transitions_do_not_wake_subscribers() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx = monitor.subscribe();
    let _ = *rx.borrow_and_update();

    monitor.set_online(false);
    assert!(!rx.has_changed().unwrap());

    monitor.set_online(true);
    assert!(rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_drive_forwards_state_until_monitor_drops() {
    let mut coordinator =
        SyncCoordinator::new(FakeRemote::new(), MemoryStore::new(), EngineConfig::default());

    let monitor = ConnectivityMonitor::new(false);
    monitor.set_online(true);
    let rx = monitor.subscribe();
    drop(monitor);

    // The loop applies the latest state, then returns once the sender is gone.
    drive(&mut coordinator, rx).await;
    assert!(coordinator.is_online());
}

#[tokio::test]
async fn test_drive_applies_offline_state() {
    let mut coordinator =
        SyncCoordinator::new(FakeRemote::new(), MemoryStore::new(), EngineConfig::default());

    let monitor = ConnectivityMonitor::new(false);
    let rx = monitor.subscribe();
    drop(monitor);

    drive(&mut coordinator, rx).await;
    assert!(!coordinator.is_online());
}
