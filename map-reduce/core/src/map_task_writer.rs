// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::atomic_file::write_atomically;
use crate::{KeyValue, MapError, RecordWriter, StreamNaming};
use fnv::FnvHasher;
use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use tracing::info;

/// Partition hash shared by every map task of a job
pub fn ihash(key: &str) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(key.as_bytes());
    (hasher.finish() & 0x7fff_ffff) as u32
}

/// Map side of the shuffle: runs the map function over one input file and
/// writes one intermediate stream per reduce partition.
#[derive(Debug, Clone)]
pub struct MapTaskWriter {
    naming: StreamNaming,
}

impl MapTaskWriter {
    pub fn new(naming: StreamNaming) -> Self {
        Self { naming }
    }

    /// Every partition in `0..n_reduce` gets a stream, even an empty one, so
    /// reduce tasks never miss an input because a map emitted nothing for it.
    pub fn run<F>(
        &self,
        job_name: &str,
        map_task: usize,
        input: &Path,
        n_reduce: usize,
        map_fn: F,
    ) -> Result<Vec<PathBuf>, MapError>
    where
        F: FnOnce(&str, &str) -> Vec<KeyValue>,
    {
        if n_reduce == 0 {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(input).map_err(|source| MapError::ReadInput {
            path: input.to_path_buf(),
            source,
        })?;

        let mut partitions: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
        let emitted = map_fn(&input.to_string_lossy(), &contents);
        let total = emitted.len();
        for record in emitted {
            let partition = ihash(&record.key) as usize % n_reduce;
            partitions[partition].push(record);
        }

        let mut written = Vec::with_capacity(n_reduce);
        for (partition, records) in partitions.iter().enumerate() {
            let path = self.naming.intermediate(job_name, map_task, partition);
            write_atomically(&path, |out| {
                let mut writer = RecordWriter::new(out);
                records.iter().try_for_each(|record| writer.write(record))
            })
            .map_err(|source| MapError::WriteIntermediate {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        info!(
            job = job_name,
            map_task,
            input = %input.display(),
            records = total,
            partitions = n_reduce,
            "intermediate streams written"
        );
        Ok(written)
    }
}
