// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync coordinator.
//!
//! Owns the entity collections, the offline operation queue, and the
//! connectivity state. Mutations apply to local state synchronously
//! (optimistic-first) and enqueue an operation; the queue is drained against
//! the remote store when online, and reconciliation pulls full server
//! snapshots and merges them without losing unsynced local edits.
//!
//! Drain triggers: a connectivity transition to online (see
//! [`crate::connectivity`]), sign-in, an explicit [`SyncCoordinator::sync`]
//! call from the embedding app (after mutations or on a timer), and the tail
//! of a successful reconciliation.
//!
//! Two mutual-exclusion flags (`draining`, `reconciling`) are checked and
//! set before any awaited call, so rapid connectivity flapping or duplicate
//! UI triggers cannot start overlapping cycles.

use std::collections::HashSet;

use chrono::Utc;

use daybook_core::{
    EntityKind, List, ListFallback, ListPatch, Moment, MomentPatch, NewList, NewMoment, NewTask,
    OpId, OpPayload, Operation, Profile, Record, RecordId, SyncStatus, Task, TaskPatch,
};

use crate::collection::Collection;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::queue::OfflineQueue;
use crate::store::durable::{keys, DurableStore};
use crate::store::remote::{RemoteError, RemoteResult, RemoteStore};

/// Offline-first sync coordinator.
///
/// All mutation of the collections and the queue goes through this type;
/// every change is written through to the durable store before returning.
pub struct SyncCoordinator<R, S> {
    remote: R,
    store: S,
    config: EngineConfig,
    user_id: Option<String>,
    tasks: Collection<Task>,
    lists: Collection<List>,
    moments: Collection<Moment>,
    profile: Option<Profile>,
    queue: OfflineQueue,
    online: bool,
    draining: bool,
    reconciling: bool,
    last_error: Option<String>,
    cleanup_done: bool,
    synced_once: bool,
}

impl<R, S> SyncCoordinator<R, S>
where
    R: RemoteStore,
    S: DurableStore,
{
    /// Create a coordinator, recovering collections, queue, and session from
    /// the durable store. Starts offline until a connectivity signal arrives.
    pub fn new(remote: R, store: S, config: EngineConfig) -> Self {
        let tasks = Collection::load(&store, keys::TASKS);
        let lists = Collection::load(&store, keys::LISTS);
        let moments = Collection::load(&store, keys::MOMENTS);
        let profile = store.load(keys::PROFILE);
        let queue = OfflineQueue::load(&store);
        let user_id: Option<String> = store.load(keys::SESSION);

        if let Some(user) = &user_id {
            tracing::info!(user = %user, "restored session");
        }

        SyncCoordinator {
            remote,
            store,
            config,
            user_id,
            tasks,
            lists,
            moments,
            profile,
            queue,
            online: false,
            draining: false,
            reconciling: false,
            last_error: None,
            cleanup_done: false,
            synced_once: false,
        }
    }

    // -- state accessors ----------------------------------------------------

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Local task collection.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.records()
    }

    /// Local list collection.
    pub fn lists(&self) -> &[List] {
        self.lists.records()
    }

    /// Local moment collection.
    pub fn moments(&self) -> &[Moment] {
        self.moments.records()
    }

    /// The user's profile, once pulled.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Number of operations awaiting replay.
    pub fn pending_ops(&self) -> usize {
        self.queue.len()
    }

    /// Current connectivity state.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// The latest drain/reconciliation error message, if any.
    ///
    /// Overwritten by the next error, cleared when a new drain cycle starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Discard every queued operation (escape hatch when the queue holds
    /// operations the server will never accept).
    pub fn clear_queue(&mut self) {
        self.queue.clear(&mut self.store);
        self.last_error = None;
    }

    // -- session lifecycle --------------------------------------------------

    /// Sign in and reconcile with the remote store.
    ///
    /// Signing in as a different user than the current session first clears
    /// all local state, as if the previous user had signed out.
    pub async fn sign_in(&mut self, user_id: &str) {
        if self.user_id.as_deref().is_some_and(|u| u != user_id) {
            tracing::warn!("sign-in with a different user; discarding previous local state");
            self.sign_out();
        }
        self.user_id = Some(user_id.to_string());
        if let Err(e) = self.store.save(keys::SESSION, &user_id) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        self.reconcile().await;
    }

    /// Sign out: clears all four collections, the queue, the session, and
    /// any error state.
    pub fn sign_out(&mut self) {
        tracing::info!("signing out; clearing local state");
        self.tasks.replace_all(&mut self.store, Vec::new());
        self.lists.replace_all(&mut self.store, Vec::new());
        self.moments.replace_all(&mut self.store, Vec::new());
        self.profile = None;
        self.queue.clear(&mut self.store);
        for key in [keys::PROFILE, keys::SESSION] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear stored value");
            }
        }
        self.user_id = None;
        self.last_error = None;
        self.cleanup_done = false;
        self.synced_once = false;
    }

    /// Report a connectivity transition.
    ///
    /// Coming online with replay work pending (or with a restored session
    /// that has never synced) triggers reconciliation, which drains first.
    pub async fn set_online(&mut self, online: bool) {
        if self.online == online {
            return;
        }
        self.online = online;
        tracing::info!(online, "connectivity changed");

        if online && self.user_id.is_some() && (!self.queue.is_empty() || !self.synced_once) {
            self.reconcile().await;
        }
    }

    /// Attempt to drain the queue now. No-op when offline, already draining,
    /// or idle. Intended to be called by the embedding app after a burst of
    /// mutations or on a timer.
    pub async fn sync(&mut self) -> usize {
        self.drain_queue().await
    }

    // -- mutation APIs: tasks -----------------------------------------------

    /// Create a task locally and queue its ADD.
    ///
    /// Applies synchronously; never blocks on network I/O, and being offline
    /// is not an error. Fails only when no user is signed in.
    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        let user = self.require_user()?;
        let task = Task::local(&user, new);
        self.tasks.insert(&mut self.store, task.clone());
        self.queue.enqueue(
            &mut self.store,
            Operation::new(OpPayload::AddTask {
                temp_id: task.id.clone(),
                draft: task.draft(),
            }),
        );
        Ok(task)
    }

    /// Apply a partial update to a task.
    ///
    /// A temp-id target folds the edit into the still-queued ADD so the
    /// record reaches the server with its final content in a single insert.
    /// Unknown ids are ignored (fire-and-forget, like every non-add path).
    pub fn update_task(&mut self, id: &RecordId, patch: TaskPatch) {
        let found = self.tasks.patch_with(&mut self.store, id, |t| {
            t.apply(&patch);
            t.updated_at = Some(Utc::now());
            t.status = SyncStatus::Pending;
        });
        if !found {
            tracing::debug!(%id, "update for unknown task ignored");
            return;
        }

        if id.is_temp() {
            if !self.queue.merge_task_update(&mut self.store, id, &patch) {
                tracing::warn!(%id, "temp task has no queued add to fold into");
            }
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::UpdateTask {
                    id: id.clone(),
                    patch,
                }),
            );
        }
    }

    /// Delete a task.
    ///
    /// A temp-id target cancels the still-queued ADD entirely: that record
    /// never produces a remote call. A durable id queues a DELETE.
    pub fn delete_task(&mut self, id: &RecordId) {
        if self.tasks.remove(&mut self.store, id).is_none() {
            tracing::debug!(%id, "delete for unknown task ignored");
            return;
        }

        if id.is_temp() {
            self.queue.take_add(&mut self.store, id);
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::DeleteTask { id: id.clone() }),
            );
        }
    }

    // -- mutation APIs: lists -----------------------------------------------

    /// Create a list locally and queue its ADD.
    pub fn add_list(&mut self, new: NewList) -> Result<List> {
        let user = self.require_user()?;
        let list = List::local(&user, new);
        self.lists.insert(&mut self.store, list.clone());
        self.queue.enqueue(
            &mut self.store,
            Operation::new(OpPayload::AddList {
                temp_id: list.id.clone(),
                draft: list.draft(),
            }),
        );
        Ok(list)
    }

    /// Apply a partial update to a list.
    ///
    /// A rename cascades: every task filed under the old name is retargeted
    /// locally (status pending). If the list's own ADD is still queued, the
    /// rename is folded into it and into any queued task ADD drafts under
    /// the old name; otherwise the UPDATE carries `renamed_from` so the
    /// drain can run the server-side cascade.
    pub fn update_list(&mut self, id: &RecordId, patch: ListPatch) {
        let old_name = match self.lists.get(id) {
            Some(list) => list.name.clone(),
            None => {
                tracing::debug!(%id, "update for unknown list ignored");
                return;
            }
        };

        self.lists.patch_with(&mut self.store, id, |l| {
            l.apply(&patch);
            l.status = SyncStatus::Pending;
        });

        let new_name = patch
            .name
            .as_ref()
            .filter(|name| **name != old_name)
            .cloned();

        if let Some(new_name) = &new_name {
            self.tasks.patch_all(&mut self.store, |task| {
                if task.category.as_deref() == Some(old_name.as_str()) {
                    task.category = Some(new_name.clone());
                    task.status = SyncStatus::Pending;
                    true
                } else {
                    false
                }
            });
        }

        if id.is_temp() {
            if !self.queue.merge_list_update(&mut self.store, id, &patch) {
                tracing::warn!(%id, "temp list has no queued add to fold into");
            }
            if let Some(new_name) = &new_name {
                self.queue
                    .rewrite_task_drafts(&mut self.store, &old_name, Some(new_name));
            }
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::UpdateList {
                    id: id.clone(),
                    patch,
                    renamed_from: new_name.map(|_| old_name),
                }),
            );
        }
    }

    /// Delete a list, reassigning its tasks to a fallback list.
    ///
    /// Prefers the configured fallback name ("Personal" by default), then
    /// any other remaining list; with no list left, tasks lose their
    /// category. The DELETE carries the fallback name/color so the remote
    /// reassignment happens server-side too.
    pub fn delete_list(&mut self, id: &RecordId) {
        let Some(list) = self.lists.remove(&mut self.store, id) else {
            tracing::debug!(%id, "delete for unknown list ignored");
            return;
        };

        let fallback = pick_fallback(self.lists.records(), &self.config.fallback_list);
        let fallback_name = fallback.as_ref().map(|f| f.name.clone());

        self.tasks.patch_all(&mut self.store, |task| {
            if task.category.as_deref() == Some(list.name.as_str()) {
                task.category = fallback_name.clone();
                task.status = SyncStatus::Pending;
                true
            } else {
                false
            }
        });
        self.queue
            .rewrite_task_drafts(&mut self.store, &list.name, fallback_name.as_deref());

        if id.is_temp() {
            self.queue.take_add(&mut self.store, id);
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::DeleteList {
                    id: id.clone(),
                    old_name: list.name,
                    fallback,
                }),
            );
        }
    }

    // -- mutation APIs: moments ---------------------------------------------

    /// Create a moment locally and queue its ADD.
    pub fn add_moment(&mut self, new: NewMoment) -> Result<Moment> {
        let user = self.require_user()?;
        let moment = Moment::local(&user, new);
        self.moments.insert(&mut self.store, moment.clone());
        self.queue.enqueue(
            &mut self.store,
            Operation::new(OpPayload::AddMoment {
                temp_id: moment.id.clone(),
                draft: moment.draft(),
            }),
        );
        Ok(moment)
    }

    /// Apply a partial update to a moment.
    pub fn update_moment(&mut self, id: &RecordId, patch: MomentPatch) {
        let found = self.moments.patch_with(&mut self.store, id, |m| {
            m.apply(&patch);
            m.status = SyncStatus::Pending;
        });
        if !found {
            tracing::debug!(%id, "update for unknown moment ignored");
            return;
        }

        if id.is_temp() {
            if !self.queue.merge_moment_update(&mut self.store, id, &patch) {
                tracing::warn!(%id, "temp moment has no queued add to fold into");
            }
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::UpdateMoment {
                    id: id.clone(),
                    patch,
                }),
            );
        }
    }

    /// Delete a moment.
    pub fn delete_moment(&mut self, id: &RecordId) {
        if self.moments.remove(&mut self.store, id).is_none() {
            tracing::debug!(%id, "delete for unknown moment ignored");
            return;
        }

        if id.is_temp() {
            self.queue.take_add(&mut self.store, id);
        } else {
            self.queue.enqueue(
                &mut self.store,
                Operation::new(OpPayload::DeleteMoment { id: id.clone() }),
            );
        }
    }

    // -- queue drain --------------------------------------------------------

    /// Drain the offline queue against the remote store.
    ///
    /// Processes a snapshot of the queue strictly in insertion order, one
    /// operation at a time. On the first failure the cycle stops: confirmed
    /// operations are removed from the queue (never replayed), the failing
    /// operation and everything after it stay queued for the next trigger,
    /// and the failure becomes the latest error message.
    ///
    /// Returns the number of operations confirmed this cycle.
    pub async fn drain_queue(&mut self) -> usize {
        if !self.online || self.draining || self.queue.is_empty() {
            return 0;
        }
        self.draining = true;
        self.last_error = None;

        let (confirmed, failure) = self.drain_snapshot().await;

        self.draining = false;
        if let Some(message) = failure {
            tracing::warn!(confirmed, error = %message, "drain halted");
            self.last_error = Some(message);
        } else {
            tracing::info!(confirmed, "drain complete");
        }
        confirmed
    }

    /// Run one drain cycle over a snapshot of the queue. Returns the number
    /// of confirmed operations and the halting failure, if any.
    async fn drain_snapshot(&mut self) -> (usize, Option<String>) {
        let snapshot = self.queue.snapshot();
        let mut confirmed: Vec<OpId> = Vec::new();
        let mut failure = None;

        for op in snapshot {
            match self.apply_remote(&op).await {
                Ok(()) => confirmed.push(op.id),
                Err(e) => {
                    failure = Some(format!("{} failed: {e}", op.payload.kind()));
                    break;
                }
            }
        }

        let count = confirmed.len();
        self.queue.remove_ids(&mut self.store, &confirmed);
        (count, failure)
    }

    /// Dispatch a single operation to the remote store and patch local state
    /// on success.
    async fn apply_remote(&mut self, op: &Operation) -> RemoteResult<()> {
        tracing::debug!(op = op.payload.kind(), id = %op.id, "replaying");
        match &op.payload {
            OpPayload::AddTask { temp_id, draft } => {
                let mut row = self.remote.insert_task(draft).await?;
                row.status = SyncStatus::Synced;
                if !self.tasks.replace_record(&mut self.store, temp_id, row) {
                    tracing::debug!(%temp_id, "confirmed task no longer present locally");
                }
                Ok(())
            }
            OpPayload::UpdateTask { id, patch } => {
                self.remote.update_task(require_durable(id)?, patch).await?;
                self.tasks
                    .patch_with(&mut self.store, id, |t| t.status = SyncStatus::Synced);
                Ok(())
            }
            OpPayload::DeleteTask { id } => self.remote.delete_task(require_durable(id)?).await,

            OpPayload::AddList { temp_id, draft } => {
                let mut row = self.remote.insert_list(draft).await?;
                row.status = SyncStatus::Synced;
                if !self.lists.replace_record(&mut self.store, temp_id, row) {
                    tracing::debug!(%temp_id, "confirmed list no longer present locally");
                }
                Ok(())
            }
            OpPayload::UpdateList {
                id,
                patch,
                renamed_from,
            } => {
                self.remote.update_list(require_durable(id)?, patch).await?;
                if let (Some(old_name), Some(new_name)) = (renamed_from, patch.name.as_ref()) {
                    let user = self.user_id.clone().unwrap_or_default();
                    self.remote
                        .reassign_task_category(&user, old_name, new_name)
                        .await?;
                    self.confirm_cascaded_tasks(Some(new_name));
                }
                self.lists
                    .patch_with(&mut self.store, id, |l| l.status = SyncStatus::Synced);
                Ok(())
            }
            OpPayload::DeleteList { id, fallback, .. } => {
                self.remote
                    .delete_list(require_durable(id)?, fallback.as_ref())
                    .await?;
                self.confirm_cascaded_tasks(fallback.as_ref().map(|f| f.name.as_str()));
                Ok(())
            }

            OpPayload::AddMoment { temp_id, draft } => {
                let mut row = self.remote.insert_moment(draft).await?;
                row.status = SyncStatus::Synced;
                if !self.moments.replace_record(&mut self.store, temp_id, row) {
                    tracing::debug!(%temp_id, "confirmed moment no longer present locally");
                }
                Ok(())
            }
            OpPayload::UpdateMoment { id, patch } => {
                self.remote
                    .update_moment(require_durable(id)?, patch)
                    .await?;
                self.moments
                    .patch_with(&mut self.store, id, |m| m.status = SyncStatus::Synced);
                Ok(())
            }
            OpPayload::DeleteMoment { id } => self.remote.delete_moment(require_durable(id)?).await,
        }
    }

    /// After a server-side category cascade succeeds, settle the status of
    /// tasks that were only pending because of that cascade. Tasks with
    /// their own queued operation keep their pending status.
    fn confirm_cascaded_tasks(&mut self, category: Option<&str>) {
        let queue = &self.queue;
        self.tasks.patch_all(&mut self.store, |task| {
            if task.category.as_deref() == category
                && task.status == SyncStatus::Pending
                && !queue.references(&task.id)
            {
                task.status = SyncStatus::Synced;
                true
            } else {
                false
            }
        });
    }

    // -- reconciliation -----------------------------------------------------

    /// Pull full server snapshots and merge them into local state.
    ///
    /// Drains the queue first: pulling before draining would let a stale
    /// server snapshot overwrite an optimistic local delete or edit that
    /// has not been sent yet. Any failure in the drain or the fetch aborts
    /// the whole reconciliation, leaving local collections untouched and a
    /// single error message set.
    pub async fn reconcile(&mut self) {
        if self.user_id.is_none() || !self.online || self.reconciling {
            return;
        }
        self.reconciling = true;

        match self.reconcile_inner().await {
            Ok(()) => {
                tracing::info!("reconciliation complete");
                self.synced_once = true;
                self.reconciling = false;
                self.run_cleanup();
                if !self.queue.is_empty() {
                    // Cleanup may have queued fresh deletes.
                    self.drain_queue().await;
                }
            }
            Err(message) => {
                tracing::error!(error = %message, "reconciliation failed");
                self.last_error = Some(message);
                self.reconciling = false;
            }
        }
    }

    async fn reconcile_inner(&mut self) -> std::result::Result<(), String> {
        // Step 1: drain fully. A halted drain aborts the pull.
        if !self.queue.is_empty() {
            self.draining = true;
            self.last_error = None;
            let (_, failure) = self.drain_snapshot().await;
            self.draining = false;
            if let Some(message) = failure {
                return Err(message);
            }
        }

        let user = self.user_id.clone().ok_or_else(|| "not signed in".to_string())?;

        // Step 2: fetch every collection in parallel. A profile that does
        // not exist yet is not a failure.
        let profile_fut = async {
            match self.remote.fetch_profile(&user).await {
                Ok(profile) => Ok(Some(profile)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        };
        let fetched = tokio::try_join!(
            self.remote.select_tasks(&user),
            self.remote.select_lists(&user),
            self.remote.select_moments(&user),
            profile_fut,
        );
        let (tasks, lists, moments, profile) = match fetched {
            Ok(parts) => parts,
            Err(e) => return Err(format!("pull failed: {e}")),
        };

        // Step 3: merge per record id and swap each collection atomically.
        let merged_tasks = merge_records(
            self.tasks.records(),
            tasks,
            &self.queue.queued_deletes(EntityKind::Task),
        );
        let merged_lists = merge_records(
            self.lists.records(),
            lists,
            &self.queue.queued_deletes(EntityKind::List),
        );
        let merged_moments = merge_records(
            self.moments.records(),
            moments,
            &self.queue.queued_deletes(EntityKind::Moment),
        );

        self.tasks.replace_all(&mut self.store, merged_tasks);
        self.lists.replace_all(&mut self.store, merged_lists);
        self.moments.replace_all(&mut self.store, merged_moments);

        self.profile = profile;
        match &self.profile {
            Some(profile) => {
                if let Err(e) = self.store.save(keys::PROFILE, profile) {
                    tracing::warn!(error = %e, "failed to persist profile");
                }
            }
            None => {
                if let Err(e) = self.store.remove(keys::PROFILE) {
                    tracing::warn!(error = %e, "failed to clear stored profile");
                }
            }
        }

        Ok(())
    }

    // -- housekeeping -------------------------------------------------------

    /// Delete completed tasks older than the configured retention window.
    /// Runs at most once per session; the flag resets at sign-out.
    fn run_cleanup(&mut self) {
        if self.cleanup_done || self.config.completed_retention_days == 0 {
            return;
        }
        self.cleanup_done = true;

        let cutoff = Utc::now() - chrono::Duration::days(self.config.completed_retention_days as i64);
        let stale: Vec<RecordId> = self
            .tasks
            .records()
            .iter()
            .filter(|t| t.completed)
            .filter(|t| t.updated_at.or(t.created_at).is_some_and(|ts| ts < cutoff))
            .map(|t| t.id.clone())
            .collect();

        if stale.is_empty() {
            return;
        }
        tracing::info!(count = stale.len(), "removing old completed tasks");
        for id in &stale {
            self.delete_task(id);
        }
    }

    fn require_user(&self) -> Result<String> {
        self.user_id.clone().ok_or(Error::Unauthenticated)
    }
}

/// Pick the list that orphaned tasks get reassigned to: the configured
/// fallback name if such a list remains, else any other list.
fn pick_fallback(remaining: &[List], preferred: &str) -> Option<ListFallback> {
    let chosen = remaining
        .iter()
        .find(|l| l.name == preferred)
        .or_else(|| remaining.first())?;
    Some(ListFallback {
        name: chosen.name.clone(),
        color: chosen.color.clone(),
    })
}

/// Merge a server snapshot into the local collection, per record id:
///
/// - ids with a queued DELETE are dropped from the snapshot (a local delete
///   not yet confirmed must not be resurrected),
/// - a local `pending` record wins over the server row with the same id,
/// - local `pending` records absent from the snapshot (still in flight,
///   including temp-id records) are preserved.
fn merge_records<T: Record>(
    local: &[T],
    server: Vec<T>,
    queued_deletes: &HashSet<RecordId>,
) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(server.len());
    let mut seen: HashSet<RecordId> = HashSet::new();

    for mut row in server {
        if queued_deletes.contains(row.id()) {
            continue;
        }
        seen.insert(row.id().clone());
        match local.iter().find(|l| l.id() == row.id()) {
            Some(existing) if existing.status() == SyncStatus::Pending => {
                merged.push(existing.clone());
            }
            _ => {
                row.set_status(SyncStatus::Synced);
                merged.push(row);
            }
        }
    }

    for existing in local {
        if existing.status() == SyncStatus::Pending && !seen.contains(existing.id()) {
            merged.push(existing.clone());
        }
    }

    merged
}

/// Queued operations must reference durable ids by the time they replay;
/// an ADD that resolves earlier in the same cycle rewrites nothing here
/// because temp-id edits were folded into the ADD at mutation time.
fn require_durable(id: &RecordId) -> RemoteResult<i64> {
    id.as_durable()
        .ok_or_else(|| RemoteError::new(format!("operation references unconfirmed id {id}")))
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
