// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::{
    ihash, DecodePolicy, KeyValue, MapError, MapTaskWriter, Phase, RecordReader, ReduceMerger,
    StreamNaming, Task, TaskExecutionError, TaskExecutor,
};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

fn split_words(_name: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split_whitespace()
        .map(|w| KeyValue::new(w, "1"))
        .collect()
}

fn count(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}

fn read_stream(path: &Path) -> Vec<KeyValue> {
    let file = File::open(path).unwrap();
    RecordReader::new(BufReader::new(file), path, DecodePolicy::Strict)
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_ihash_is_stable_and_non_negative() {
    assert_eq!(ihash("cat"), ihash("cat"));
    assert!(ihash("anything") <= 0x7fff_ffff);
}

#[test]
fn test_records_routed_to_hash_partition() {
    let dir = tempfile::tempdir().unwrap();
    let naming = StreamNaming::new(dir.path());
    let input = dir.path().join("input.txt");
    fs::write(&input, "a b c d e f g a").unwrap();

    let writer = MapTaskWriter::new(naming.clone());
    let written = writer.run("job", 4, &input, 3, split_words).unwrap();

    assert_eq!(written.len(), 3, "one stream per partition, even if empty");
    let mut total = 0;
    for (partition, path) in written.iter().enumerate() {
        assert_eq!(*path, naming.intermediate("job", 4, partition));
        let records = read_stream(path);
        for record in &records {
            assert_eq!(ihash(&record.key) as usize % 3, partition);
        }
        total += records.len();
    }
    assert_eq!(total, 8);
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let writer = MapTaskWriter::new(StreamNaming::new(dir.path()));

    let result = writer.run("job", 0, &dir.path().join("nope"), 2, split_words);
    assert!(matches!(result, Err(MapError::ReadInput { .. })));
}

#[test]
fn test_executor_runs_map_then_reduce_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let naming = StreamNaming::new(dir.path());
    let inputs: Vec<String> = ["x y x", "y z"]
        .iter()
        .enumerate()
        .map(|(i, body)| {
            let path = dir.path().join(format!("in-{}", i));
            fs::write(&path, body).unwrap();
            path.to_string_lossy().into_owned()
        })
        .collect();
    let executor = TaskExecutor::new(naming.clone(), DecodePolicy::Strict, split_words, count);

    for (i, input) in inputs.iter().enumerate() {
        executor
            .execute(&Task {
                job_name: "job".to_string(),
                input: input.clone(),
                phase: Phase::Map,
                task_index: i,
                other_phase_count: 2,
            })
            .unwrap();
    }
    for partition in 0..2 {
        executor
            .execute(&Task {
                job_name: "job".to_string(),
                input: inputs[partition % inputs.len()].clone(),
                phase: Phase::Reduce,
                task_index: partition,
                other_phase_count: 2,
            })
            .unwrap();
    }

    let mut all: Vec<KeyValue> = (0..2)
        .flat_map(|p| read_stream(&naming.reduce_output("job", p)))
        .collect();
    all.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(
        all,
        vec![
            KeyValue::new("x", "2"),
            KeyValue::new("y", "2"),
            KeyValue::new("z", "1"),
        ]
    );
}

#[test]
fn test_reduce_before_map_fails_with_merge_error() {
    let dir = tempfile::tempdir().unwrap();
    let naming = StreamNaming::new(dir.path());
    let executor = TaskExecutor::new(naming.clone(), DecodePolicy::Lenient, split_words, count);

    let result = executor.execute(&Task {
        job_name: "job".to_string(),
        input: "unused".to_string(),
        phase: Phase::Reduce,
        task_index: 0,
        other_phase_count: 1,
    });
    assert!(matches!(result, Err(TaskExecutionError::Merge(_))));

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    assert!(merger.group_partition("job", 0, 0).unwrap().is_empty());
}
