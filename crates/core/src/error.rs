// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for daybook-core operations.

use thiserror::Error;

/// All possible errors that can occur in daybook-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("expected a durable id, got temporary id '{0}'\n  hint: temporary ids are only valid until the creating operation is confirmed")]
    NotDurable(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: synced, pending")]
    InvalidStatus(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for daybook-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
