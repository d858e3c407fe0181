// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory entity collections mirrored to durable storage.
//!
//! A collection is an unordered set of records keyed by id, written through
//! to the durable store on every mutation. Readers always see a fully
//! applied state: optimistic edits land here synchronously, before the
//! corresponding operation is enqueued.

use daybook_core::{Record, RecordId, SyncStatus};
use serde::{de::DeserializeOwned, Serialize};

use crate::store::durable::DurableStore;

/// A write-through mirror of one remote collection.
#[derive(Debug)]
pub struct Collection<R> {
    key: &'static str,
    records: Vec<R>,
}

impl<R> Collection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Load the collection stored under `key` (restart recovery).
    pub fn load<S: DurableStore>(store: &S, key: &'static str) -> Self {
        let records: Vec<R> = store.load(key).unwrap_or_default();
        Collection { key, records }
    }

    /// All records, unordered.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Ids of records not yet confirmed by the remote store.
    pub fn pending_ids(&self) -> Vec<RecordId> {
        self.records
            .iter()
            .filter(|r| r.status() == SyncStatus::Pending)
            .map(|r| r.id().clone())
            .collect()
    }

    /// Insert a new record and write through.
    pub fn insert<S: DurableStore>(&mut self, store: &mut S, record: R) {
        self.records.push(record);
        self.persist(store);
    }

    /// Mutate the record with the given id in place.
    ///
    /// Returns false if no such record exists.
    pub fn patch_with<S: DurableStore>(
        &mut self,
        store: &mut S,
        id: &RecordId,
        f: impl FnOnce(&mut R),
    ) -> bool {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                f(record);
                self.persist(store);
                true
            }
            None => false,
        }
    }

    /// Mutate every record the closure touches; the closure returns whether
    /// it changed the record. Used for cascades (e.g. list rename).
    pub fn patch_all<S: DurableStore>(
        &mut self,
        store: &mut S,
        mut f: impl FnMut(&mut R) -> bool,
    ) -> usize {
        let mut changed = 0;
        for record in &mut self.records {
            if f(record) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist(store);
        }
        changed
    }

    /// Remove and return the record with the given id.
    pub fn remove<S: DurableStore>(&mut self, store: &mut S, id: &RecordId) -> Option<R> {
        let pos = self.records.iter().position(|r| r.id() == id)?;
        let record = self.records.remove(pos);
        self.persist(store);
        Some(record)
    }

    /// Replace the record matching `old_id` with `record` wholesale.
    ///
    /// This is how an ADD confirmation swaps a temp-id record for the
    /// canonical server row.
    pub fn replace_record<S: DurableStore>(
        &mut self,
        store: &mut S,
        old_id: &RecordId,
        record: R,
    ) -> bool {
        match self.records.iter_mut().find(|r| r.id() == old_id) {
            Some(slot) => {
                *slot = record;
                self.persist(store);
                true
            }
            None => false,
        }
    }

    /// Atomically replace the whole collection with a merged result.
    ///
    /// The merge computes a full new collection value and swaps it in one
    /// step; readers never observe a partially merged state.
    pub fn replace_all<S: DurableStore>(&mut self, store: &mut S, records: Vec<R>) {
        self.records = records;
        self.persist(store);
    }

    fn persist<S: DurableStore>(&self, store: &mut S) {
        if let Err(e) = store.save(self.key, &self.records) {
            // Best effort: the in-memory mirror stays authoritative.
            tracing::warn!(key = self.key, error = %e, "failed to persist collection");
        }
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
