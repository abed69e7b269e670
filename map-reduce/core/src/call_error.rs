// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Failure of a single `DoTask` call. The scheduler treats every variant the
/// same way: the worker is dropped and the task is retried elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("worker reported the task as failed")]
    Rejected,

    #[error("transport failure: {0}")]
    Transport(String),
}
