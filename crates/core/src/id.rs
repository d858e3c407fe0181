// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record identifiers.
//!
//! Every entity record carries either a *durable* id assigned by the remote
//! store or a *temporary* id generated locally at creation time. Temporary
//! ids are prefixed so the two are distinguishable in logs and payloads, and
//! live only until the creating ADD operation is confirmed, at which point
//! the record is patched with the server-assigned durable id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for locally generated temporary ids.
pub const TEMP_PREFIX: &str = "temp-";

/// Identifier of an entity record.
///
/// Serialized untagged: durable ids are JSON numbers (as returned by the
/// remote store), temporary ids are JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Server-assigned id, stable and comparable.
    Durable(i64),
    /// Locally generated id, valid only until the record is confirmed.
    Temp(String),
}

impl RecordId {
    /// Generates a fresh temporary id.
    pub fn new_temp() -> Self {
        RecordId::Temp(format!("{TEMP_PREFIX}{}", Uuid::new_v4()))
    }

    /// Returns true if this is a temporary (unconfirmed) id.
    pub fn is_temp(&self) -> bool {
        matches!(self, RecordId::Temp(_))
    }

    /// Returns the durable id, if this record has been confirmed.
    pub fn as_durable(&self) -> Option<i64> {
        match self {
            RecordId::Durable(n) => Some(*n),
            RecordId::Temp(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Durable(n) => write!(f, "{n}"),
            RecordId::Temp(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Durable(n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
