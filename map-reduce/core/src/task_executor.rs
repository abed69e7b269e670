// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    DecodePolicy, KeyValue, MapError, MapTaskWriter, MergeError, Phase, ReduceMerger,
    StreamNaming, Task,
};
use std::path::Path;
use thiserror::Error;

/// Application map function: `(input name, contents) -> records`
pub type MapFn = fn(&str, &str) -> Vec<KeyValue>;

/// Application combine function: `(key, values) -> value`
pub type CombineFn = fn(&str, &[String]) -> String;

#[derive(Debug, Error)]
pub enum TaskExecutionError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Worker-side execution of a single `DoTask` request
#[derive(Clone)]
pub struct TaskExecutor {
    writer: MapTaskWriter,
    merger: ReduceMerger,
    map_fn: MapFn,
    combine_fn: CombineFn,
}

impl TaskExecutor {
    pub fn new(
        naming: StreamNaming,
        policy: DecodePolicy,
        map_fn: MapFn,
        combine_fn: CombineFn,
    ) -> Self {
        Self {
            writer: MapTaskWriter::new(naming.clone()),
            merger: ReduceMerger::new(naming, policy),
            map_fn,
            combine_fn,
        }
    }

    pub fn execute(&self, task: &Task) -> Result<(), TaskExecutionError> {
        match task.phase {
            Phase::Map => {
                self.writer.run(
                    &task.job_name,
                    task.task_index,
                    Path::new(&task.input),
                    task.other_phase_count,
                    self.map_fn,
                )?;
            }
            Phase::Reduce => {
                self.merger.merge(
                    &task.job_name,
                    task.task_index,
                    task.other_phase_count,
                    self.combine_fn,
                )?;
            }
        }
        Ok(())
    }
}
