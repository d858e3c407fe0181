// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the remote store contract, plus the in-memory fake backend the
//! coordinator tests run against.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use daybook_core::{
    List, ListDraft, ListFallback, ListPatch, Moment, MomentDraft, MomentPatch, Profile, Record,
    RecordId, SyncStatus, Task, TaskDraft, TaskPatch,
};

use super::remote::{RemoteError, RemoteResult, RemoteStore};

#[derive(Default)]
struct Inner {
    next_id: i64,
    tasks: Vec<Task>,
    lists: Vec<List>,
    moments: Vec<Moment>,
    profile: Option<Profile>,
    calls: Vec<String>,
    fail: HashSet<String>,
}

/// In-memory remote store with a call log and scripted per-method failures.
///
/// Inserts assign sequential durable ids starting at 1, the way a real
/// backend would. Clones share state, so a test can keep a handle after
/// handing the fake to a coordinator.
#[derive(Clone)]
pub(crate) struct FakeRemote {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        FakeRemote {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            })),
        }
    }

    /// Make every call to `method` fail until cleared.
    pub fn fail_method(&self, method: &str) {
        self.inner.lock().unwrap().fail.insert(method.to_string());
    }

    /// Stop failing calls.
    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().fail.clear();
    }

    /// Every method invoked so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Snapshot of the server-side task rows.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.clone()
    }

    /// Snapshot of the server-side list rows.
    pub fn lists(&self) -> Vec<List> {
        self.inner.lock().unwrap().lists.clone()
    }

    /// Snapshot of the server-side moment rows.
    pub fn moments(&self) -> Vec<Moment> {
        self.inner.lock().unwrap().moments.clone()
    }

    /// Seed a task row, as if another device had synced it.
    pub fn seed_task(&self, task: Task) {
        let mut inner = self.inner.lock().unwrap();
        bump_next_id(&mut inner.next_id, task.id());
        inner.tasks.push(task);
    }

    /// Seed a list row.
    pub fn seed_list(&self, list: List) {
        let mut inner = self.inner.lock().unwrap();
        bump_next_id(&mut inner.next_id, list.id());
        inner.lists.push(list);
    }

    /// Seed a moment row.
    pub fn seed_moment(&self, moment: Moment) {
        let mut inner = self.inner.lock().unwrap();
        bump_next_id(&mut inner.next_id, moment.id());
        inner.moments.push(moment);
    }

    /// Seed the profile row.
    pub fn set_profile(&self, profile: Profile) {
        self.inner.lock().unwrap().profile = Some(profile);
    }

    fn begin(&self, method: &str) -> RemoteResult<std::sync::MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(method.to_string());
        if inner.fail.contains(method) {
            return Err(RemoteError::new(format!("{method}: scripted failure")));
        }
        Ok(inner)
    }
}

fn bump_next_id(next_id: &mut i64, id: &RecordId) {
    if let Some(n) = id.as_durable() {
        *next_id = (*next_id).max(n + 1);
    }
}

fn assign_id(inner: &mut Inner) -> i64 {
    let id = inner.next_id;
    inner.next_id += 1;
    id
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn insert_task(&self, draft: &TaskDraft) -> RemoteResult<Task> {
        let mut inner = self.begin("insert_task")?;
        let id = assign_id(&mut inner);
        let task = Task {
            id: id.into(),
            user_id: draft.user_id.clone(),
            title: draft.title.clone(),
            notes: draft.notes.clone(),
            category: draft.category.clone(),
            completed: draft.completed,
            due_date: draft.due_date,
            created_at: Some(Utc::now()),
            updated_at: None,
            status: SyncStatus::Synced,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> RemoteResult<()> {
        let mut inner = self.begin("update_task")?;
        let row = inner
            .tasks
            .iter_mut()
            .find(|t| t.id.as_durable() == Some(id))
            .ok_or_else(|| RemoteError::not_found(format!("task {id} not found")))?;
        row.apply(patch);
        row.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_task(&self, id: i64) -> RemoteResult<()> {
        let mut inner = self.begin("delete_task")?;
        inner.tasks.retain(|t| t.id.as_durable() != Some(id));
        Ok(())
    }

    async fn select_tasks(&self, user_id: &str) -> RemoteResult<Vec<Task>> {
        let inner = self.begin("select_tasks")?;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn reassign_task_category(
        &self,
        user_id: &str,
        old_name: &str,
        new_name: &str,
    ) -> RemoteResult<()> {
        let mut inner = self.begin("reassign_task_category")?;
        for task in &mut inner.tasks {
            if task.user_id == user_id && task.category.as_deref() == Some(old_name) {
                task.category = Some(new_name.to_string());
            }
        }
        Ok(())
    }

    async fn insert_list(&self, draft: &ListDraft) -> RemoteResult<List> {
        let mut inner = self.begin("insert_list")?;
        let id = assign_id(&mut inner);
        let list = List {
            id: id.into(),
            user_id: draft.user_id.clone(),
            name: draft.name.clone(),
            color: draft.color.clone(),
            created_at: Some(Utc::now()),
            status: SyncStatus::Synced,
        };
        inner.lists.push(list.clone());
        Ok(list)
    }

    async fn update_list(&self, id: i64, patch: &ListPatch) -> RemoteResult<()> {
        let mut inner = self.begin("update_list")?;
        let row = inner
            .lists
            .iter_mut()
            .find(|l| l.id.as_durable() == Some(id))
            .ok_or_else(|| RemoteError::not_found(format!("list {id} not found")))?;
        row.apply(patch);
        Ok(())
    }

    async fn delete_list(&self, id: i64, fallback: Option<&ListFallback>) -> RemoteResult<()> {
        let mut inner = self.begin("delete_list")?;
        let Some(pos) = inner.lists.iter().position(|l| l.id.as_durable() == Some(id)) else {
            return Ok(());
        };
        let removed = inner.lists.remove(pos);
        let new_category = fallback.map(|f| f.name.clone());
        for task in &mut inner.tasks {
            if task.category.as_deref() == Some(removed.name.as_str()) {
                task.category = new_category.clone();
            }
        }
        Ok(())
    }

    async fn select_lists(&self, user_id: &str) -> RemoteResult<Vec<List>> {
        let inner = self.begin("select_lists")?;
        Ok(inner
            .lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_moment(&self, draft: &MomentDraft) -> RemoteResult<Moment> {
        let mut inner = self.begin("insert_moment")?;
        let id = assign_id(&mut inner);
        let moment = Moment {
            id: id.into(),
            user_id: draft.user_id.clone(),
            content: draft.content.clone(),
            mood: draft.mood.clone(),
            happened_at: draft.happened_at,
            created_at: Some(Utc::now()),
            status: SyncStatus::Synced,
        };
        inner.moments.push(moment.clone());
        Ok(moment)
    }

    async fn update_moment(&self, id: i64, patch: &MomentPatch) -> RemoteResult<()> {
        let mut inner = self.begin("update_moment")?;
        let row = inner
            .moments
            .iter_mut()
            .find(|m| m.id.as_durable() == Some(id))
            .ok_or_else(|| RemoteError::not_found(format!("moment {id} not found")))?;
        row.apply(patch);
        Ok(())
    }

    async fn delete_moment(&self, id: i64) -> RemoteResult<()> {
        let mut inner = self.begin("delete_moment")?;
        inner.moments.retain(|m| m.id.as_durable() != Some(id));
        Ok(())
    }

    async fn select_moments(&self, user_id: &str) -> RemoteResult<Vec<Moment>> {
        let inner = self.begin("select_moments")?;
        Ok(inner
            .moments
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<Profile> {
        let inner = self.begin("fetch_profile")?;
        inner
            .profile
            .clone()
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| RemoteError::not_found(format!("no profile for {user_id}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::test_helpers::server_task;
use daybook_core::NewTask;

fn draft_for(user: &str, title: &str) -> TaskDraft {
    Task::local(
        user,
        NewTask {
            title: title.to_string(),
            ..Default::default()
        },
    )
    .draft()
}

#[tokio::test]
async fn test_insert_assigns_sequential_durable_ids() {
    let remote = FakeRemote::new();

    let a = remote.insert_task(&draft_for("u1", "first")).await.unwrap();
    let b = remote.insert_task(&draft_for("u1", "second")).await.unwrap();

    assert_eq!(a.id.as_durable(), Some(1));
    assert_eq!(b.id.as_durable(), Some(2));
    assert_eq!(a.status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_seeding_advances_the_id_counter() {
    let remote = FakeRemote::new();
    remote.seed_task(server_task(42, "u1", "existing", None));

    let inserted = remote.insert_task(&draft_for("u1", "new")).await.unwrap();
    assert_eq!(inserted.id.as_durable(), Some(43));
}

#[tokio::test]
async fn test_select_is_scoped_to_user() {
    let remote = FakeRemote::new();
    remote.seed_task(server_task(1, "alice", "hers", None));
    remote.seed_task(server_task(2, "bob", "his", None));

    let rows = remote.select_tasks("alice").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "hers");
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let remote = FakeRemote::new();
    let err = remote
        .update_task(99, &TaskPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_scripted_failure_and_recovery() {
    let remote = FakeRemote::new();
    remote.fail_method("insert_task");

    let err = remote.insert_task(&draft_for("u1", "t")).await.unwrap_err();
    assert!(!err.is_not_found());

    remote.clear_failures();
    assert!(remote.insert_task(&draft_for("u1", "t")).await.is_ok());

    // The failed attempt is still in the call log.
    assert_eq!(remote.calls(), vec!["insert_task", "insert_task"]);
}

#[tokio::test]
async fn test_reassign_task_category() {
    let remote = FakeRemote::new();
    remote.seed_task(server_task(1, "u1", "a", Some("Work")));
    remote.seed_task(server_task(2, "u1", "b", Some("Home")));

    remote
        .reassign_task_category("u1", "Work", "Office")
        .await
        .unwrap();

    let rows = remote.select_tasks("u1").await.unwrap();
    assert_eq!(rows[0].category.as_deref(), Some("Office"));
    assert_eq!(rows[1].category.as_deref(), Some("Home"));
}

#[tokio::test]
async fn test_delete_list_reassigns_orphans() {
    let remote = FakeRemote::new();
    remote.seed_list(crate::test_helpers::server_list(1, "u1", "Work"));
    remote.seed_task(server_task(2, "u1", "a", Some("Work")));

    let fallback = ListFallback {
        name: "Personal".to_string(),
        color: "#fff".to_string(),
    };
    remote.delete_list(1, Some(&fallback)).await.unwrap();

    assert!(remote.lists().is_empty());
    assert_eq!(remote.tasks()[0].category.as_deref(), Some("Personal"));
}

#[tokio::test]
async fn test_delete_list_without_fallback_clears_category() {
    let remote = FakeRemote::new();
    remote.seed_list(crate::test_helpers::server_list(1, "u1", "Work"));
    remote.seed_task(server_task(2, "u1", "a", Some("Work")));

    remote.delete_list(1, None).await.unwrap();

    assert_eq!(remote.tasks()[0].category, None);
}

#[test]
fn test_remote_error_not_found_roundtrip() {
    let err = RemoteError::not_found("row missing");
    let json = serde_json::to_string(&err).unwrap();
    let back: RemoteError = serde_json::from_str(&json).unwrap();
    assert!(back.is_not_found());
    assert_eq!(back.to_string(), "row missing");
}
