// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage contracts for the sync engine.
//!
//! Two narrow seams connect the engine to the outside world:
//!
//! - [`durable::DurableStore`]: a local key-value store that survives
//!   process restarts; holds each entity collection, the offline queue,
//!   and the session.
//! - [`remote::RemoteStore`]: the backend API, one set of CRUD calls per
//!   entity collection. Every call fails or succeeds atomically and returns
//!   the canonical row(s) on success.

pub mod durable;
pub mod remote;


#[cfg(test)]
pub(crate) mod remote_tests;
