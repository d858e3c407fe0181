// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store contract.
//!
//! A request/response API with per-collection insert/update/delete/select.
//! Each call fails or succeeds atomically; inserts return the canonical row
//! with the server-assigned durable id and timestamps.
//!
//! The trait seam exists so the coordinator can be tested against an
//! in-memory fake with scripted failures (see `remote_tests`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use daybook_core::{
    List, ListDraft, ListFallback, ListPatch, Moment, MomentDraft, MomentPatch, Profile, Task,
    TaskDraft, TaskPatch,
};

/// Machine code a remote store uses for "row does not exist".
pub const CODE_NOT_FOUND: &str = "not_found";

/// Error returned by a remote store call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Human-readable message.
    pub message: String,
    /// Optional details from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Optional hint for resolving the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Optional machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl RemoteError {
    /// Creates an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        RemoteError {
            message: message.into(),
            details: None,
            hint: None,
            code: None,
        }
    }

    /// Creates a "row not found" error.
    pub fn not_found(message: impl Into<String>) -> Self {
        RemoteError {
            message: message.into(),
            details: None,
            hint: None,
            code: Some(CODE_NOT_FOUND.to_string()),
        }
    }

    /// True if the backend reported that the requested row does not exist.
    ///
    /// During a profile fetch this means "no profile yet", not a failure.
    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(CODE_NOT_FOUND)
    }
}

/// Result type for remote store calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The backend API, one set of CRUD calls per entity collection.
///
/// All rows are scoped to a user; `select_*` calls return only that user's
/// rows. Implementations translate their wire errors into [`RemoteError`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // -- tasks --------------------------------------------------------------

    /// Insert a task; the server assigns the durable id and timestamps.
    async fn insert_task(&self, draft: &TaskDraft) -> RemoteResult<Task>;

    /// Partially update a task by durable id.
    async fn update_task(&self, id: i64, patch: &TaskPatch) -> RemoteResult<()>;

    /// Delete a task by durable id.
    async fn delete_task(&self, id: i64) -> RemoteResult<()>;

    /// Fetch all of the user's tasks.
    async fn select_tasks(&self, user_id: &str) -> RemoteResult<Vec<Task>>;

    /// Retarget every task filed under `old_name` to `new_name`
    /// (server-side list rename cascade).
    async fn reassign_task_category(
        &self,
        user_id: &str,
        old_name: &str,
        new_name: &str,
    ) -> RemoteResult<()>;

    // -- lists --------------------------------------------------------------

    /// Insert a list; the server assigns the durable id and timestamps.
    async fn insert_list(&self, draft: &ListDraft) -> RemoteResult<List>;

    /// Partially update a list by durable id.
    async fn update_list(&self, id: i64, patch: &ListPatch) -> RemoteResult<()>;

    /// Delete a list by durable id, reassigning its tasks to `fallback`
    /// server-side when one is given.
    async fn delete_list(&self, id: i64, fallback: Option<&ListFallback>) -> RemoteResult<()>;

    /// Fetch all of the user's lists.
    async fn select_lists(&self, user_id: &str) -> RemoteResult<Vec<List>>;

    // -- moments ------------------------------------------------------------

    /// Insert a moment; the server assigns the durable id and timestamps.
    async fn insert_moment(&self, draft: &MomentDraft) -> RemoteResult<Moment>;

    /// Partially update a moment by durable id.
    async fn update_moment(&self, id: i64, patch: &MomentPatch) -> RemoteResult<()>;

    /// Delete a moment by durable id.
    async fn delete_moment(&self, id: i64) -> RemoteResult<()>;

    /// Fetch all of the user's moments.
    async fn select_moments(&self, user_id: &str) -> RemoteResult<Vec<Moment>>;

    // -- profile ------------------------------------------------------------

    /// Fetch the user's profile row.
    ///
    /// A [not-found](RemoteError::is_not_found) error means the profile has
    /// not been created yet; the coordinator treats it as `None`.
    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<Profile>;
}
