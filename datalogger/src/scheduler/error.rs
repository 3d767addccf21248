/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the cooperative scheduler.
//!
//! Only registration can fail.  Once the loop is running, `tick()` has no
//! error path at all: task failures are handled inside the task (or counted
//! in its [`TaskStats`](super::TaskStats)) and never reach the caller.

use thiserror::Error;

/// Registration-time error returned by
/// [`CooperativeScheduler::register()`](super::CooperativeScheduler::register).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Task names identify records and diagnostics; an empty one is rejected.
    #[error("task name must not be empty")]
    EmptyName,

    /// A task with this name is already registered.
    #[error("task '{name}' is already registered")]
    DuplicateTask { name: String },

    /// The task set is fixed once the first tick has run.
    #[error("cannot register task '{name}': the scheduler is already running")]
    RegistrationClosed { name: String },
}
