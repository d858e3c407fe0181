// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity signal wiring.
//!
//! The runtime environment owns the real online/offline events (browser
//! events, NetworkMonitor, netlink - whatever the platform offers) and
//! reports them through a [`ConnectivityMonitor`]. The [`drive`] loop
//! forwards transitions to the coordinator for the life of the process;
//! a transition to online with a non-empty queue triggers reconciliation,
//! debounced by the coordinator's own mutual-exclusion flags rather than by
//! time.

use tokio::sync::watch;

use crate::coordinator::SyncCoordinator;
use crate::store::durable::DurableStore;
use crate::store::remote::RemoteStore;

/// Source of the boolean online/offline state.
///
/// Clone-free handle around a watch channel: platform integrations call
/// [`set_online`](Self::set_online), the engine subscribes.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state.
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        ConnectivityMonitor { tx }
    }

    /// Report a connectivity transition.
    pub fn set_online(&self, online: bool) {
        // send_if_modified keeps flapping from waking subscribers twice
        // for the same state.
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Current state.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        ConnectivityMonitor::new(false)
    }
}

/// Forward connectivity transitions to the coordinator until the monitor is
/// dropped. Intended to be spawned for the process lifetime.
pub async fn drive<R, S>(coordinator: &mut SyncCoordinator<R, S>, mut rx: watch::Receiver<bool>)
where
    R: RemoteStore,
    S: DurableStore,
{
    loop {
        let online = *rx.borrow_and_update();
        coordinator.set_online(online).await;

        if rx.changed().await.is_err() {
            // Monitor dropped; nothing will ever change again.
            return;
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
