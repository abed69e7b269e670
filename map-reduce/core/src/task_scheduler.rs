// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::task::phase_counts;
use crate::{plan_tasks, Phase, RetryPolicy, ScheduleError, Task, TaskInvoker, Timer, WorkerFeed};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of a completed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Number of `DoTask` calls made for each task index, the last one being
    /// the successful call
    pub attempts: Vec<u32>,
}

impl PhaseReport {
    pub fn ntasks(&self) -> usize {
        self.attempts.len()
    }

    pub fn total_attempts(&self) -> u32 {
        self.attempts.iter().sum()
    }
}

struct SchedulerParts<F, I, P, T> {
    feed: F,
    invoker: I,
    policy: P,
    timer: T,
    /// Bumped whenever a task index completes
    progress: watch::Sender<u64>,
}

/// Dispatches every task of a phase across the worker feed and returns once
/// each task index has been acknowledged by some worker.
pub struct TaskScheduler<F, I, P, T> {
    parts: Arc<SchedulerParts<F, I, P, T>>,
}

impl<F, I, P, T> TaskScheduler<F, I, P, T>
where
    F: WorkerFeed,
    I: TaskInvoker<Worker = F::Worker>,
    P: RetryPolicy,
    T: Timer,
{
    pub fn new(feed: F, invoker: I, policy: P, timer: T) -> Self {
        Self {
            parts: Arc::new(SchedulerParts {
                feed,
                invoker,
                policy,
                timer,
                progress: watch::channel(0).0,
            }),
        }
    }

    pub fn feed(&self) -> &F {
        &self.parts.feed
    }

    /// Runs one task loop per task index concurrently and waits for all of
    /// them. Failed calls are retried with another worker as the retry policy
    /// allows; the first loop that gives up aborts the remaining ones.
    pub async fn schedule(
        &self,
        job_name: &str,
        phase: Phase,
        inputs: &[String],
        n_reduce: usize,
    ) -> Result<PhaseReport, ScheduleError> {
        let tasks = plan_tasks(job_name, phase, inputs, n_reduce)?;
        let (ntasks, n_other) = phase_counts(phase, inputs.len(), n_reduce);
        info!(
            job = job_name,
            %phase,
            tasks = ntasks,
            io = n_other,
            "scheduling phase"
        );

        let mut loops = JoinSet::new();
        for task in tasks {
            let parts = Arc::clone(&self.parts);
            loops.spawn(async move { parts.run_until_done(task).await });
        }

        let mut attempts = vec![0; ntasks];
        while let Some(joined) = loops.join_next().await {
            let (task_index, made) =
                joined.map_err(|e| ScheduleError::TaskPanicked(e.to_string()))??;
            attempts[task_index] = made;
        }

        info!(job = job_name, %phase, "phase done");
        Ok(PhaseReport { phase, attempts })
    }
}

impl<F, I, P, T> SchedulerParts<F, I, P, T>
where
    F: WorkerFeed,
    I: TaskInvoker<Worker = F::Worker>,
    P: RetryPolicy,
    T: Timer,
{
    async fn run_until_done(&self, task: Task) -> Result<(usize, u32), ScheduleError> {
        let mut attempts = 0u32;
        loop {
            let worker = self.acquire_worker(task.task_index).await?;
            attempts = count_attempt(attempts);

            match self.invoker.do_task(&worker, &task).await {
                Ok(()) => {
                    debug!(
                        phase = %task.phase,
                        task = task.task_index,
                        worker = %worker,
                        attempt = attempts,
                        "task done"
                    );
                    self.feed.hand_back(worker);
                    self.progress.send_modify(|completed| *completed = completed.wrapping_add(1));
                    return Ok((task.task_index, attempts));
                }
                Err(err) => {
                    // the worker is dropped, it may re-register on its own
                    warn!(
                        phase = %task.phase,
                        task = task.task_index,
                        worker = %worker,
                        attempt = attempts,
                        error = %err,
                        "DoTask failed"
                    );
                    match self.policy.delay_before_retry(attempts) {
                        Some(delay) if !delay.is_zero() => self.timer.backoff(delay).await,
                        Some(_) => {}
                        None => {
                            return Err(ScheduleError::Stalled {
                                task_index: task.task_index,
                                attempts,
                            })
                        }
                    }
                }
            }
        }
    }

    /// Waits for an idle worker. With an acquire timeout, gives up only once
    /// a whole window passes without any task index completing, so loops
    /// queued behind busy workers keep waiting.
    async fn acquire_worker(&self, task_index: usize) -> Result<F::Worker, ScheduleError> {
        let Some(waited) = self.policy.acquire_timeout() else {
            return self
                .feed
                .next_worker()
                .await
                .ok_or(ScheduleError::PoolClosed { task_index });
        };

        let mut progress = self.progress.subscribe();
        loop {
            match tokio::time::timeout(waited, self.feed.next_worker()).await {
                Ok(next) => return next.ok_or(ScheduleError::PoolClosed { task_index }),
                Err(_) if progress.has_changed().unwrap_or(false) => {
                    progress.borrow_and_update();
                    debug!(task = task_index, "still waiting for a worker");
                }
                Err(_) => return Err(ScheduleError::WorkerAcquireTimeout { task_index, waited }),
            }
        }
    }
}

fn count_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}
