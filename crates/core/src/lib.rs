// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! daybook-core: Shared library for the daybook productivity app
//!
//! This crate provides the core data model used by the daybook sync engine:
//! entity records (tasks, lists, moments, profile), record identifiers,
//! sync status, and the offline operations that describe pending mutations.

pub mod entity;
pub mod error;
pub mod id;
pub mod op;

pub use entity::{
    List, ListDraft, ListPatch, Moment, MomentDraft, MomentPatch, NewList, NewMoment, NewTask,
    Profile, Record, SyncStatus, Task, TaskDraft, TaskPatch,
};
pub use error::{Error, Result};
pub use id::RecordId;
pub use op::{EntityKind, ListFallback, OpId, OpPayload, Operation};
