// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{CallError, Task};
use async_trait::async_trait;

/// The `DoTask` remote call.
/// Implementations exist for in-process workers and for TCP workers.
#[async_trait]
pub trait TaskInvoker: Send + Sync + 'static {
    type Worker: Send + Sync;

    /// Runs `task` on `worker` and returns once the worker acknowledged it.
    /// Any timeout is the implementation's own business.
    async fn do_task(&self, worker: &Self::Worker, task: &Task) -> Result<(), CallError>;
}
