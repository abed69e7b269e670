// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    collect_outputs, MergeError, Phase, RetryPolicy, ScheduleError, StreamNaming, TaskInvoker,
    TaskScheduler, Timer, WorkerFeed,
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Runs a whole job: the map phase, the reduce phase, then the final merge
pub struct JobDriver<F, I, P, T> {
    scheduler: TaskScheduler<F, I, P, T>,
    naming: StreamNaming,
    job_name: String,
    n_reduce: usize,
}

impl<F, I, P, T> JobDriver<F, I, P, T>
where
    F: WorkerFeed,
    I: TaskInvoker<Worker = F::Worker>,
    P: RetryPolicy,
    T: Timer,
{
    pub fn new(
        scheduler: TaskScheduler<F, I, P, T>,
        naming: StreamNaming,
        job_name: impl Into<String>,
        n_reduce: usize,
    ) -> Self {
        Self {
            scheduler,
            naming,
            job_name: job_name.into(),
            n_reduce,
        }
    }

    pub fn scheduler(&self) -> &TaskScheduler<F, I, P, T> {
        &self.scheduler
    }

    pub async fn run(&self, inputs: &[String]) -> Result<PathBuf, JobError> {
        let map = self
            .scheduler
            .schedule(&self.job_name, Phase::Map, inputs, self.n_reduce)
            .await?;
        let reduce = self
            .scheduler
            .schedule(&self.job_name, Phase::Reduce, inputs, self.n_reduce)
            .await?;

        let output = collect_outputs(&self.naming, &self.job_name, self.n_reduce)?;
        info!(
            job = %self.job_name,
            map_attempts = map.total_attempts(),
            reduce_attempts = reduce.total_attempts(),
            output = %output.display(),
            "job finished"
        );
        Ok(output)
    }
}
