// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! daybook-sync: offline-first synchronization engine.
//!
//! Lets a client mutate local state instantly, queues those mutations
//! durably, replays them against a remote store once online, and merges
//! server state back into local state without losing unsynced local edits or
//! duplicating records.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Caller    │────►│ Coordinator  │────►│ RemoteStore │
//! │ (UI layer)  │◄────│  (mutations, │◄────│   (trait)   │
//! └─────────────┘     │ drain, pull) │     └─────────────┘
//!                     └──────┬───────┘
//!                            ▼
//!              ┌─────────────┴─────────────┐
//!              │ Collections │ OfflineQueue│
//!              └─────────────┬─────────────┘
//!                            ▼
//!                     ┌──────────────┐
//!                     │ DurableStore │  (write-through)
//!                     └──────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Mutations apply to local state synchronously and never block on I/O
//! - Queued operations replay in strict FIFO order, one at a time
//! - A failed operation halts the drain cycle; confirmed operations are
//!   never replayed
//! - Reconciliation drains the queue before pulling, and never overwrites a
//!   pending local record with a server row of the same id

pub mod collection;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod queue;
pub mod store;

pub use collection::Collection;
pub use config::EngineConfig;
pub use connectivity::{drive, ConnectivityMonitor};
pub use coordinator::SyncCoordinator;
pub use error::{Error, Result};
pub use queue::OfflineQueue;
pub use store::durable::{keys, DurableStore, FileStore, MemoryStore};
pub use store::remote::{RemoteError, RemoteResult, RemoteStore};

#[cfg(test)]
mod test_helpers;
