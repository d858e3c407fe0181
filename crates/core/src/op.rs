// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline operations.
//!
//! Every mutation made while the app cannot reach the remote store is
//! represented as an operation. Operations are appended to a durable queue in
//! FIFO order, and that insertion order is the required replay order: an ADD
//! for a list must reach the server before an UPDATE to a task that
//! references it is meaningful.
//!
//! An ADD operation's `temp_id` equals the id the corresponding local record
//! was created with; that link is used to patch the record once the server
//! assigns a durable id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{ListDraft, ListPatch, MomentDraft, MomentPatch, TaskDraft, TaskPatch};
use crate::id::RecordId;

/// Unique identifier for an operation.
pub type OpId = String;

/// Which entity collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    List,
    Moment,
}

/// Reassignment target carried by a list DELETE so the server can move
/// orphaned tasks to the fallback list too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFallback {
    pub name: String,
    pub color: String,
}

/// A pending mutation not yet confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier for this operation.
    pub id: OpId,
    /// The actual mutation being performed.
    pub payload: OpPayload,
    /// When the mutation was made locally.
    pub timestamp: DateTime<Utc>,
}

impl Operation {
    /// Creates a new operation with a fresh id and the current timestamp.
    pub fn new(payload: OpPayload) -> Self {
        Operation {
            id: Uuid::new_v4().to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Returns the temporary id for ADD operations, `None` otherwise.
    pub fn temp_id(&self) -> Option<&RecordId> {
        self.payload.temp_id()
    }
}

/// Payload describing the specific mutation being performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpPayload {
    /// Create a new task.
    AddTask { temp_id: RecordId, draft: TaskDraft },

    /// Partially update an existing task.
    UpdateTask { id: RecordId, patch: TaskPatch },

    /// Delete a task.
    DeleteTask { id: RecordId },

    /// Create a new list.
    AddList { temp_id: RecordId, draft: ListDraft },

    /// Partially update an existing list.
    ///
    /// When the update renames the list, `renamed_from` carries the old name
    /// so tasks filed under it can be retargeted server-side.
    UpdateList {
        id: RecordId,
        patch: ListPatch,
        renamed_from: Option<String>,
    },

    /// Delete a list, reassigning its tasks to `fallback` (if any list is
    /// left to reassign to).
    DeleteList {
        id: RecordId,
        old_name: String,
        fallback: Option<ListFallback>,
    },

    /// Create a new moment.
    AddMoment { temp_id: RecordId, draft: MomentDraft },

    /// Partially update an existing moment.
    UpdateMoment { id: RecordId, patch: MomentPatch },

    /// Delete a moment.
    DeleteMoment { id: RecordId },
}

impl OpPayload {
    /// The entity collection this operation targets.
    pub fn entity(&self) -> EntityKind {
        match self {
            OpPayload::AddTask { .. } | OpPayload::UpdateTask { .. } | OpPayload::DeleteTask { .. } => {
                EntityKind::Task
            }
            OpPayload::AddList { .. } | OpPayload::UpdateList { .. } | OpPayload::DeleteList { .. } => {
                EntityKind::List
            }
            OpPayload::AddMoment { .. }
            | OpPayload::UpdateMoment { .. }
            | OpPayload::DeleteMoment { .. } => EntityKind::Moment,
        }
    }

    /// Short name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            OpPayload::AddTask { .. } => "add_task",
            OpPayload::UpdateTask { .. } => "update_task",
            OpPayload::DeleteTask { .. } => "delete_task",
            OpPayload::AddList { .. } => "add_list",
            OpPayload::UpdateList { .. } => "update_list",
            OpPayload::DeleteList { .. } => "delete_list",
            OpPayload::AddMoment { .. } => "add_moment",
            OpPayload::UpdateMoment { .. } => "update_moment",
            OpPayload::DeleteMoment { .. } => "delete_moment",
        }
    }

    /// Returns the temporary id for ADD operations, `None` otherwise.
    pub fn temp_id(&self) -> Option<&RecordId> {
        match self {
            OpPayload::AddTask { temp_id, .. }
            | OpPayload::AddList { temp_id, .. }
            | OpPayload::AddMoment { temp_id, .. } => Some(temp_id),
            _ => None,
        }
    }

    /// The record id this operation concerns: the temporary id for ADDs,
    /// the target id for UPDATEs and DELETEs.
    pub fn target_id(&self) -> &RecordId {
        match self {
            OpPayload::AddTask { temp_id, .. }
            | OpPayload::AddList { temp_id, .. }
            | OpPayload::AddMoment { temp_id, .. } => temp_id,
            OpPayload::UpdateTask { id, .. }
            | OpPayload::DeleteTask { id }
            | OpPayload::UpdateList { id, .. }
            | OpPayload::DeleteList { id, .. }
            | OpPayload::UpdateMoment { id, .. }
            | OpPayload::DeleteMoment { id } => id,
        }
    }

    /// Returns the target id for DELETE operations, `None` otherwise.
    pub fn delete_target(&self) -> Option<&RecordId> {
        match self {
            OpPayload::DeleteTask { id }
            | OpPayload::DeleteList { id, .. }
            | OpPayload::DeleteMoment { id } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
