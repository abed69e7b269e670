// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::atomic_file::write_atomically;
use crate::{DecodePolicy, KeyValue, MergeError, RecordReader, StreamNaming};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use tracing::info;

/// Joins the outputs of all reduce tasks into the job's final output,
/// one `key: value` line per key in ascending key order.
pub fn collect_outputs(
    naming: &StreamNaming,
    job_name: &str,
    n_reduce: usize,
) -> Result<PathBuf, MergeError> {
    let mut merged = BTreeMap::new();

    for partition in 0..n_reduce {
        let path = naming.reduce_output(job_name, partition);
        let file = File::open(&path).map_err(|source| MergeError::MissingIntermediate {
            path: path.clone(),
            source,
        })?;

        for record in RecordReader::new(BufReader::new(file), &path, DecodePolicy::Strict) {
            let KeyValue { key, value } = record?;
            merged.insert(key, value);
        }
    }

    let output = naming.final_output(job_name);
    write_atomically(&output, |out| {
        for (key, value) in &merged {
            writeln!(out, "{}: {}", key, value)?;
        }
        Ok(())
    })
    .map_err(|source| MergeError::Io {
        path: output.clone(),
        source,
    })?;

    info!(
        job = job_name,
        keys = merged.len(),
        output = %output.display(),
        "final output written"
    );
    Ok(output)
}
