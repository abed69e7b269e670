// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Phase;
use std::time::Duration;
use thiserror::Error;

/// Reasons a phase could not be driven to completion.
///
/// Individual `DoTask` failures never show up here; they are retried. These
/// variants only surface once the retry policy has given up on a task or the
/// worker feed itself is unusable.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{phase} has {ntasks} tasks but no task inputs")]
    EmptyInputs { phase: Phase, ntasks: usize },

    #[error("task {task_index} stalled after {attempts} failed attempts")]
    Stalled { task_index: usize, attempts: u32 },

    #[error("no worker became available for task {task_index} and no task completed within {waited:?}")]
    WorkerAcquireTimeout { task_index: usize, waited: Duration },

    #[error("worker feed closed while task {task_index} was waiting for a worker")]
    PoolClosed { task_index: usize },

    #[error("task loop panicked: {0}")]
    TaskPanicked(String),
}
