// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use daybook_core::{List, Moment, NewList, NewMoment, NewTask, SyncStatus, Task};

/// Create task input with just a title.
pub fn make_new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..Default::default()
    }
}

/// Create task input filed under a list.
pub fn make_new_task_in(title: &str, category: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        category: Some(category.to_string()),
        ..Default::default()
    }
}

/// Create list input with a fixed color.
pub fn make_new_list(name: &str) -> NewList {
    NewList {
        name: name.to_string(),
        color: "#8058d8".to_string(),
    }
}

/// Create moment input timestamped now.
pub fn make_new_moment(content: &str) -> NewMoment {
    NewMoment {
        content: content.to_string(),
        mood: None,
        happened_at: Utc::now(),
    }
}

/// Build a server-side task row with a durable id.
pub fn server_task(id: i64, user_id: &str, title: &str, category: Option<&str>) -> Task {
    Task {
        id: id.into(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        notes: None,
        category: category.map(str::to_string),
        completed: false,
        due_date: None,
        created_at: Some(Utc::now()),
        updated_at: None,
        status: SyncStatus::Synced,
    }
}

/// Build a server-side list row with a durable id.
pub fn server_list(id: i64, user_id: &str, name: &str) -> List {
    List {
        id: id.into(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        color: "#3a86ff".to_string(),
        created_at: Some(Utc::now()),
        status: SyncStatus::Synced,
    }
}

/// Build a server-side moment row with a durable id.
pub fn server_moment(id: i64, user_id: &str, content: &str) -> Moment {
    Moment {
        id: id.into(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        mood: None,
        happened_at: Utc::now(),
        created_at: Some(Utc::now()),
        status: SyncStatus::Synced,
    }
}
