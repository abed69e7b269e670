// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::atomic_file::write_atomically;
use crate::{DecodePolicy, KeyValue, MergeError, RecordReader, RecordWriter, StreamNaming};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, info};

/// Values grouped per key, keys in ascending byte order
pub type GroupedValues = BTreeMap<String, Vec<String>>;

/// Reduce side of the shuffle: gathers one partition from every map task,
/// groups it by key and writes the combined, key-sorted output stream.
#[derive(Debug, Clone)]
pub struct ReduceMerger {
    naming: StreamNaming,
    policy: DecodePolicy,
}

impl ReduceMerger {
    pub fn new(naming: StreamNaming, policy: DecodePolicy) -> Self {
        Self { naming, policy }
    }

    pub fn naming(&self) -> &StreamNaming {
        &self.naming
    }

    /// Reads partition `partition` from map tasks `0..n_map`.
    ///
    /// Values keep their arrival order: ascending map task index first, then
    /// the order records appear in each stream.
    pub fn group_partition(
        &self,
        job_name: &str,
        partition: usize,
        n_map: usize,
    ) -> Result<GroupedValues, MergeError> {
        let mut grouped = GroupedValues::new();

        for map_task in 0..n_map {
            let path = self.naming.intermediate(job_name, map_task, partition);
            let file = File::open(&path).map_err(|source| MergeError::MissingIntermediate {
                path: path.clone(),
                source,
            })?;

            let mut reader = RecordReader::new(BufReader::new(file), &path, self.policy);
            for record in reader.by_ref() {
                let KeyValue { key, value } = record?;
                grouped.entry(key).or_default().push(value);
            }
            debug!(
                job = job_name,
                partition,
                map_task,
                records = reader.decoded(),
                "read intermediate stream"
            );
        }

        Ok(grouped)
    }

    /// Runs the reduce step for one partition and returns the output path.
    ///
    /// `combine` is called once per distinct key, in ascending key order. The
    /// output stream is replaced as a whole, so re-running the merge with the
    /// same inputs yields byte-identical output.
    pub fn merge<F>(
        &self,
        job_name: &str,
        partition: usize,
        n_map: usize,
        mut combine: F,
    ) -> Result<PathBuf, MergeError>
    where
        F: FnMut(&str, &[String]) -> String,
    {
        let grouped = self.group_partition(job_name, partition, n_map)?;
        let output = self.naming.reduce_output(job_name, partition);

        write_atomically(&output, |out| {
            let mut writer = RecordWriter::new(out);
            for (key, values) in &grouped {
                let value = combine(key, values);
                writer.write(&KeyValue::new(key.as_str(), value))?;
            }
            Ok(())
        })
        .map_err(|source| MergeError::Io {
            path: output.clone(),
            source,
        })?;

        info!(
            job = job_name,
            partition,
            keys = grouped.len(),
            output = %output.display(),
            "reduce output written"
        );
        Ok(output)
    }
}
