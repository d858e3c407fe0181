// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity records for the daybook app.
//!
//! This module contains the four record types mirrored from the remote store
//! (Task, List, Moment, Profile) together with their *drafts* (the exact
//! field set sent to the remote on insert) and *patches* (partial updates).
//!
//! Every mirrored record carries a [`SyncStatus`]: `pending` means the local
//! copy may differ from, or not yet exist on, the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::id::RecordId;

/// Synchronization status of a locally held record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The local copy matches the last known remote state.
    #[default]
    Synced,
    /// The local copy has edits not yet confirmed by the remote store.
    Pending,
}

impl SyncStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "synced" => Ok(SyncStatus::Synced),
            "pending" => Ok(SyncStatus::Pending),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Uniform access to id and sync status, used by the generic collection and
/// the reconciliation merge.
pub trait Record: Clone {
    /// The record's identifier.
    fn id(&self) -> &RecordId;
    /// Replace the record's identifier (temp id -> durable id patching).
    fn set_id(&mut self, id: RecordId);
    /// Current sync status.
    fn status(&self) -> SyncStatus;
    /// Set the sync status.
    fn set_status(&mut self, status: SyncStatus);
}

macro_rules! impl_record {
    ($ty:ty) => {
        impl Record for $ty {
            fn id(&self) -> &RecordId {
                &self.id
            }
            fn set_id(&mut self, id: RecordId) {
                self.id = id;
            }
            fn status(&self) -> SyncStatus {
                self.status
            }
            fn set_status(&mut self, status: SyncStatus) {
                self.status = status;
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A to-do item, optionally filed under a list (by list name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Name of the list this task belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: SyncStatus,
}

/// Caller-facing input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// The exact field set sent to the remote store when inserting a task.
///
/// Ids, timestamps, and sync status are deliberately absent: the server
/// assigns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update to a task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Constructs the optimistic local record for a brand-new task.
    pub fn local(user_id: &str, new: NewTask) -> Self {
        Task {
            id: RecordId::new_temp(),
            user_id: user_id.to_string(),
            title: new.title,
            notes: new.notes,
            category: new.category,
            completed: false,
            due_date: new.due_date,
            created_at: Some(Utc::now()),
            updated_at: None,
            status: SyncStatus::Pending,
        }
    }

    /// Builds the insert payload, stripping fields the server assigns.
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            notes: self.notes.clone(),
            category: self.category.clone(),
            completed: self.completed,
            due_date: self.due_date,
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
    }
}

impl TaskDraft {
    /// Folds a partial update into this draft (temp-id edit collapse).
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
    }
}

impl_record!(Task);

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// A named list (category) that tasks can be filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: RecordId,
    pub user_id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: SyncStatus,
}

/// Caller-facing input for creating a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
    pub color: String,
}

/// The exact field set sent to the remote store when inserting a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDraft {
    pub user_id: String,
    pub name: String,
    pub color: String,
}

/// Partial update to a list. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl List {
    /// Constructs the optimistic local record for a brand-new list.
    pub fn local(user_id: &str, new: NewList) -> Self {
        List {
            id: RecordId::new_temp(),
            user_id: user_id.to_string(),
            name: new.name,
            color: new.color,
            created_at: Some(Utc::now()),
            status: SyncStatus::Pending,
        }
    }

    /// Builds the insert payload, stripping fields the server assigns.
    pub fn draft(&self) -> ListDraft {
        ListDraft {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &ListPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

impl ListDraft {
    /// Folds a partial update into this draft (temp-id edit collapse).
    pub fn apply(&mut self, patch: &ListPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

impl_record!(List);

// ---------------------------------------------------------------------------
// Moment
// ---------------------------------------------------------------------------

/// A journal entry capturing a moment in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    pub id: RecordId,
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub happened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: SyncStatus,
}

/// Caller-facing input for creating a moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMoment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub happened_at: DateTime<Utc>,
}

/// The exact field set sent to the remote store when inserting a moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentDraft {
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub happened_at: DateTime<Utc>,
}

/// Partial update to a moment. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happened_at: Option<DateTime<Utc>>,
}

impl Moment {
    /// Constructs the optimistic local record for a brand-new moment.
    pub fn local(user_id: &str, new: NewMoment) -> Self {
        Moment {
            id: RecordId::new_temp(),
            user_id: user_id.to_string(),
            content: new.content,
            mood: new.mood,
            happened_at: new.happened_at,
            created_at: Some(Utc::now()),
            status: SyncStatus::Pending,
        }
    }

    /// Builds the insert payload, stripping fields the server assigns.
    pub fn draft(&self) -> MomentDraft {
        MomentDraft {
            user_id: self.user_id.clone(),
            content: self.content.clone(),
            mood: self.mood.clone(),
            happened_at: self.happened_at,
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &MomentPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(mood) = &patch.mood {
            self.mood = Some(mood.clone());
        }
        if let Some(happened_at) = patch.happened_at {
            self.happened_at = happened_at;
        }
    }
}

impl MomentDraft {
    /// Folds a partial update into this draft (temp-id edit collapse).
    pub fn apply(&mut self, patch: &MomentPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(mood) = &patch.mood {
            self.mood = Some(mood.clone());
        }
        if let Some(happened_at) = patch.happened_at {
            self.happened_at = happened_at;
        }
    }
}

impl_record!(Moment);

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The user's profile row. Pull-only: profile edits are out of scope for the
/// offline operation queue, so this record carries no sync status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: RecordId,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
