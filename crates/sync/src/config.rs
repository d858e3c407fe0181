// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the sync engine.

/// Tunables for the sync coordinator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Preferred fallback list when a list is deleted and its tasks need a
    /// new home.
    pub fallback_list: String,
    /// Completed tasks older than this many days are removed by the
    /// once-per-session cleanup pass. Zero disables cleanup.
    pub completed_retention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fallback_list: "Personal".to_string(),
            completed_retention_days: 30,
        }
    }
}
