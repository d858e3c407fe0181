// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use thiserror::Error;

use crate::store::remote::RemoteError;

/// All possible errors that can occur in the sync engine.
///
/// Remote failures during a queue drain or a reconciliation pull are *not*
/// raised to callers as errors; they are recorded as the coordinator's
/// latest error message and retried on the next trigger.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not signed in\n  hint: mutations require an authenticated user")]
    Unauthenticated,

    #[error("remote operation failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("reconciliation failed: {0}")]
    Reconcile(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Core(#[from] daybook_core::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for sync engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
