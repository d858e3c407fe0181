// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline operation queue.
//!
//! An ordered, durable log of pending mutations not yet confirmed by the
//! remote store. Operations are held in FIFO insertion order - the required
//! replay order - and mirrored to the durable store on every mutation, so a
//! process restart mid-drain resumes with an accurate queue.

use std::collections::HashSet;

use daybook_core::{
    EntityKind, ListPatch, MomentPatch, OpId, OpPayload, Operation, RecordId, TaskPatch,
};

use crate::store::durable::{keys, DurableStore};

/// Durable FIFO queue of pending operations.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    ops: Vec<Operation>,
}

impl OfflineQueue {
    /// Load the queue from the durable store (restart recovery).
    pub fn load<S: DurableStore>(store: &S) -> Self {
        let ops: Vec<Operation> = store.load(keys::SYNC_QUEUE).unwrap_or_default();
        if !ops.is_empty() {
            tracing::info!(pending = ops.len(), "recovered offline queue");
        }
        OfflineQueue { ops }
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append an operation and write the queue through to the store.
    pub fn enqueue<S: DurableStore>(&mut self, store: &mut S, op: Operation) {
        tracing::debug!(op = op.payload.kind(), id = %op.id, "enqueue");
        self.ops.push(op);
        self.persist(store);
    }

    /// Ordered copy of the queue, taken at drain start.
    ///
    /// The drain operates on this snapshot; mutation APIs may append to the
    /// live queue while a drain is awaiting the network.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.ops.clone()
    }

    /// Remove the operations with the given ids, preserving order of the
    /// rest. Used to drop confirmed operations after a drain cycle.
    pub fn remove_ids<S: DurableStore>(&mut self, store: &mut S, ids: &[OpId]) {
        if ids.is_empty() {
            return;
        }
        let confirmed: HashSet<&OpId> = ids.iter().collect();
        self.ops.retain(|op| !confirmed.contains(&op.id));
        self.persist(store);
    }

    /// Remove and return the still-queued ADD operation for `temp_id`.
    ///
    /// Deleting a never-synced record cancels its ADD entirely: nothing was
    /// ever sent, so nothing needs to be sent.
    pub fn take_add<S: DurableStore>(
        &mut self,
        store: &mut S,
        temp_id: &RecordId,
    ) -> Option<Operation> {
        let pos = self.ops.iter().position(|op| op.temp_id() == Some(temp_id))?;
        let op = self.ops.remove(pos);
        self.persist(store);
        Some(op)
    }

    /// Fold a task edit into the pending ADD for `temp_id`.
    ///
    /// Returns false if no such ADD is queued. Collapsing "create then edit
    /// offline" into a single ADD avoids an UPDATE against a row that does
    /// not exist remotely yet.
    pub fn merge_task_update<S: DurableStore>(
        &mut self,
        store: &mut S,
        temp_id: &RecordId,
        patch: &TaskPatch,
    ) -> bool {
        for op in &mut self.ops {
            if let OpPayload::AddTask { temp_id: t, draft } = &mut op.payload {
                if t == temp_id {
                    draft.apply(patch);
                    self.persist(store);
                    return true;
                }
            }
        }
        false
    }

    /// Fold a list edit into the pending ADD for `temp_id`.
    pub fn merge_list_update<S: DurableStore>(
        &mut self,
        store: &mut S,
        temp_id: &RecordId,
        patch: &ListPatch,
    ) -> bool {
        for op in &mut self.ops {
            if let OpPayload::AddList { temp_id: t, draft } = &mut op.payload {
                if t == temp_id {
                    draft.apply(patch);
                    self.persist(store);
                    return true;
                }
            }
        }
        false
    }

    /// Fold a moment edit into the pending ADD for `temp_id`.
    pub fn merge_moment_update<S: DurableStore>(
        &mut self,
        store: &mut S,
        temp_id: &RecordId,
        patch: &MomentPatch,
    ) -> bool {
        for op in &mut self.ops {
            if let OpPayload::AddMoment { temp_id: t, draft } = &mut op.payload {
                if t == temp_id {
                    draft.apply(patch);
                    self.persist(store);
                    return true;
                }
            }
        }
        false
    }

    /// Rewrite the category of task ADD drafts still pending under
    /// `old_category`. Used when a list rename or delete must be folded into
    /// queued creations that would otherwise reference a name the server
    /// will never know.
    pub fn rewrite_task_drafts<S: DurableStore>(
        &mut self,
        store: &mut S,
        old_category: &str,
        new_category: Option<&str>,
    ) -> usize {
        let mut changed = 0;
        for op in &mut self.ops {
            if let OpPayload::AddTask { draft, .. } = &mut op.payload {
                if draft.category.as_deref() == Some(old_category) {
                    draft.category = new_category.map(str::to_string);
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.persist(store);
        }
        changed
    }

    /// Ids with a DELETE operation still queued for the given collection.
    ///
    /// Reconciliation excludes these from the server snapshot so a local
    /// delete not yet confirmed is not resurrected by the pull.
    pub fn queued_deletes(&self, kind: EntityKind) -> HashSet<RecordId> {
        self.ops
            .iter()
            .filter(|op| op.payload.entity() == kind)
            .filter_map(|op| op.payload.delete_target().cloned())
            .collect()
    }

    /// True if any queued operation concerns the given record id.
    pub fn references(&self, id: &RecordId) -> bool {
        self.ops.iter().any(|op| op.payload.target_id() == id)
    }

    /// Discard every queued operation (escape hatch for unsendable ops).
    pub fn clear<S: DurableStore>(&mut self, store: &mut S) {
        if !self.ops.is_empty() {
            tracing::warn!(discarded = self.ops.len(), "clearing offline queue");
        }
        self.ops.clear();
        self.persist(store);
    }

    fn persist<S: DurableStore>(&self, store: &mut S) {
        if let Err(e) = store.save(keys::SYNC_QUEUE, &self.ops) {
            // Best effort: the in-memory queue stays authoritative.
            tracing::warn!(error = %e, "failed to persist offline queue");
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
