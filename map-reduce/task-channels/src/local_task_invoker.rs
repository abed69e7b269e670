// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{FastrandRandom, Random};
use async_trait::async_trait;
use map_reduce_core::{CallError, Task, TaskExecutor, TaskInvoker, WorkerRegistrar};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// Runs `DoTask` on tokio blocking threads inside this process.
///
/// Workers are plain names. Failures are injected two ways: workers listed
/// as down reject every call, and any call may crash with probability
/// `failure_rate`, either before running the task or after running it but
/// before acknowledging it.
pub struct LocalTaskInvoker<R: Random = FastrandRandom> {
    executor: TaskExecutor,
    random: R,
    down_workers: HashSet<String>,
    failure_rate: f32,
    restart: Option<(WorkerRegistrar<String>, Duration)>,
}

impl<R: Random> LocalTaskInvoker<R> {
    pub fn new(executor: TaskExecutor, random: R) -> Self {
        Self {
            executor,
            random,
            down_workers: HashSet::new(),
            failure_rate: 0.0,
            restart: None,
        }
    }

    pub fn with_down_workers(mut self, workers: impl IntoIterator<Item = String>) -> Self {
        self.down_workers.extend(workers);
        self
    }

    pub fn with_failure_rate(mut self, failure_rate: f32) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    /// Crashed workers re-register themselves after `delay`
    pub fn with_restarts(mut self, registrar: WorkerRegistrar<String>, delay: Duration) -> Self {
        self.restart = Some((registrar, delay));
        self
    }

    fn restart_later(&self, worker: &str) {
        if let Some((registrar, delay)) = &self.restart {
            let registrar = registrar.clone();
            let delay = *delay;
            let worker = worker.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                info!(worker = %worker, "worker restarted and re-registered");
                registrar.register(worker);
            });
        }
    }

    async fn run(&self, task: &Task) -> Result<(), CallError> {
        let executor = self.executor.clone();
        let task = task.clone();
        match tokio::task::spawn_blocking(move || executor.execute(&task)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!(error = %e, "task execution failed");
                Err(CallError::Rejected)
            }
            Err(e) => Err(CallError::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl<R: Random + 'static> TaskInvoker for LocalTaskInvoker<R> {
    type Worker = String;

    async fn do_task(&self, worker: &String, task: &Task) -> Result<(), CallError> {
        if self.down_workers.contains(worker) {
            return Err(CallError::Transport(format!("{} is unreachable", worker)));
        }

        let crash = self.random.chance(self.failure_rate);
        if !crash {
            return self.run(task).await;
        }

        // a crash after the work is done still loses the acknowledgement
        let outcome = if self.random.bool() {
            self.run(task).await
        } else {
            Ok(())
        };
        self.restart_later(worker);
        outcome?;
        Err(CallError::Transport(format!(
            "{} crashed during {} task {}",
            worker, task.phase, task.task_index
        )))
    }
}
