// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::{Path, PathBuf};

/// Deterministic names for every stream a job reads or writes.
/// Map writers and reduce readers agree on paths without coordination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamNaming {
    dir: PathBuf,
}

impl StreamNaming {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream written by map task `map_task` for partition `reduce_task`
    pub fn intermediate(&self, job_name: &str, map_task: usize, reduce_task: usize) -> PathBuf {
        self.dir
            .join(format!("mrtmp.{}-{}-{}", job_name, map_task, reduce_task))
    }

    pub fn reduce_output(&self, job_name: &str, reduce_task: usize) -> PathBuf {
        self.dir
            .join(format!("mrtmp.{}-res-{}", job_name, reduce_task))
    }

    pub fn final_output(&self, job_name: &str) -> PathBuf {
        self.dir.join(format!("mrtmp.{}", job_name))
    }
}
