// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

/// Waits out the backoff between retries of a task. Tests swap in a timer
/// that returns immediately.
#[async_trait::async_trait]
pub trait Timer: Send + Sync + 'static {
    async fn backoff(&self, delay: Duration);
}

pub struct TokioTimer;

#[async_trait::async_trait]
impl Timer for TokioTimer {
    async fn backoff(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
