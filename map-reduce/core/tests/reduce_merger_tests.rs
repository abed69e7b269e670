// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::{
    collect_outputs, DecodePolicy, KeyValue, MergeError, RecordReader, ReduceMerger, StreamNaming,
};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn encode(records: &[(&str, &str)]) -> String {
    records
        .iter()
        .map(|(k, v)| {
            let line = serde_json::to_string(&KeyValue::new(*k, *v)).unwrap();
            format!("{}\n", line)
        })
        .collect()
}

fn write_intermediate(naming: &StreamNaming, map_task: usize, partition: usize, body: &str) {
    fs::write(naming.intermediate("job", map_task, partition), body).unwrap();
}

fn read_output(path: &Path) -> Vec<KeyValue> {
    let file = File::open(path).unwrap();
    RecordReader::new(BufReader::new(file), path, DecodePolicy::Strict)
        .collect::<Result<_, _>>()
        .unwrap()
}

fn sum_counts(_key: &str, values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.parse::<u64>().unwrap())
        .sum::<u64>()
        .to_string()
}

fn setup() -> (TempDir, StreamNaming) {
    let dir = tempfile::tempdir().unwrap();
    let naming = StreamNaming::new(dir.path());
    (dir, naming)
}

// ============================================================
// Grouping and ordering
// ============================================================

#[test]
fn test_word_count_partition_is_combined_per_key() {
    let (_dir, naming) = setup();
    write_intermediate(&naming, 0, 0, &encode(&[("cat", "1")]));
    write_intermediate(&naming, 1, 0, &encode(&[("cat", "1"), ("dog", "1")]));

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    let output = merger.merge("job", 0, 2, sum_counts).unwrap();

    assert_eq!(
        read_output(&output),
        vec![KeyValue::new("cat", "2"), KeyValue::new("dog", "1")]
    );
}

#[test]
fn test_output_keys_strictly_increasing() {
    let (_dir, naming) = setup();
    write_intermediate(
        &naming,
        0,
        1,
        &encode(&[("pear", "1"), ("Apple", "1"), ("apple", "1"), ("pear", "1")]),
    );
    write_intermediate(
        &naming,
        1,
        1,
        &encode(&[("banana", "1"), ("apple", "1"), ("Zebra", "1")]),
    );
    write_intermediate(&naming, 2, 1, "");

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    let output = merger.merge("job", 1, 3, sum_counts).unwrap();
    let keys: Vec<String> = read_output(&output).into_iter().map(|kv| kv.key).collect();

    assert_eq!(keys, vec!["Apple", "Zebra", "apple", "banana", "pear"]);
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_values_ordered_by_map_task_then_stream_order() {
    let (_dir, naming) = setup();
    write_intermediate(&naming, 0, 0, &encode(&[("k", "m0-a"), ("k", "m0-b")]));
    write_intermediate(&naming, 1, 0, &encode(&[("other", "x"), ("k", "m1-a")]));
    write_intermediate(&naming, 2, 0, &encode(&[("k", "m2-a"), ("k", "m2-b")]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    merger
        .merge("job", 0, 3, move |key, values| {
            recorder
                .lock()
                .unwrap()
                .push((key.to_string(), values.to_vec()));
            values.join(",")
        })
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2, "combine is called once per distinct key");
    assert_eq!(seen[0].0, "k");
    assert_eq!(seen[0].1, vec!["m0-a", "m0-b", "m1-a", "m2-a", "m2-b"]);
    assert_eq!(seen[1], ("other".to_string(), vec!["x".to_string()]));
}

// ============================================================
// Idempotence
// ============================================================

#[test]
fn test_merging_twice_is_byte_identical() {
    let (_dir, naming) = setup();
    write_intermediate(&naming, 0, 0, &encode(&[("b", "1"), ("a", "1")]));
    write_intermediate(&naming, 1, 0, &encode(&[("a", "1"), ("c", "1")]));

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    let output = merger.merge("job", 0, 2, sum_counts).unwrap();
    let first = fs::read(&output).unwrap();
    merger.merge("job", 0, 2, sum_counts).unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_stale_output_is_replaced_not_appended() {
    let (_dir, naming) = setup();
    write_intermediate(&naming, 0, 0, &encode(&[("a", "1")]));
    fs::write(
        naming.reduce_output("job", 0),
        encode(&[("a", "999"), ("zzz", "1")]),
    )
    .unwrap();

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    let output = merger.merge("job", 0, 1, sum_counts).unwrap();

    assert_eq!(read_output(&output), vec![KeyValue::new("a", "1")]);
}

// ============================================================
// Failure handling
// ============================================================

#[test]
fn test_missing_intermediate_is_a_typed_error() {
    let (_dir, naming) = setup();
    write_intermediate(&naming, 0, 0, &encode(&[("a", "1")]));
    let expected_missing = naming.intermediate("job", 1, 0);
    let output = naming.reduce_output("job", 0);

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    match merger.merge("job", 0, 2, sum_counts) {
        Err(MergeError::MissingIntermediate { path, .. }) => assert_eq!(path, expected_missing),
        other => panic!("Expected MissingIntermediate, got {:?}", other),
    }
    assert!(!output.exists(), "No partial output on failure");
}

#[test]
fn test_truncated_stream_keeps_readable_prefix() {
    let (_dir, naming) = setup();
    let mut body = encode(&[("a", "1"), ("b", "1")]);
    body.push_str("{\"Key\":\"c\",\"Val");
    write_intermediate(&naming, 0, 0, &body);

    let merger = ReduceMerger::new(naming, DecodePolicy::Strict);
    let output = merger.merge("job", 0, 1, sum_counts).unwrap();

    assert_eq!(
        read_output(&output),
        vec![KeyValue::new("a", "1"), KeyValue::new("b", "1")]
    );
}

#[test]
fn test_corrupt_stream_lenient_drops_trailing_records() {
    let (_dir, naming) = setup();
    let body = format!(
        "{}not json at all\n{}",
        encode(&[("a", "1")]),
        encode(&[("b", "1")])
    );
    write_intermediate(&naming, 0, 0, &body);
    write_intermediate(&naming, 1, 0, &encode(&[("b", "1")]));

    let merger = ReduceMerger::new(naming, DecodePolicy::Lenient);
    let output = merger.merge("job", 0, 2, sum_counts).unwrap();

    assert_eq!(
        read_output(&output),
        vec![KeyValue::new("a", "1"), KeyValue::new("b", "1")]
    );
}

#[test]
fn test_corrupt_stream_strict_fails_the_merge() {
    let (_dir, naming) = setup();
    let body = format!("{}not json at all\n", encode(&[("a", "1")]));
    write_intermediate(&naming, 0, 0, &body);

    let merger = ReduceMerger::new(naming, DecodePolicy::Strict);
    let result = merger.merge("job", 0, 1, sum_counts);

    assert!(matches!(
        result,
        Err(MergeError::CorruptRecord { record: 1, .. })
    ));
}

// ============================================================
// Final output collection
// ============================================================

#[test]
fn test_collect_outputs_joins_all_partitions_sorted() {
    let (_dir, naming) = setup();
    fs::write(
        naming.reduce_output("job", 0),
        encode(&[("b", "2"), ("d", "1")]),
    )
    .unwrap();
    fs::write(
        naming.reduce_output("job", 1),
        encode(&[("a", "5"), ("c", "3")]),
    )
    .unwrap();

    let output = collect_outputs(&naming, "job", 2).unwrap();

    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "a: 5\nb: 2\nc: 3\nd: 1\n"
    );
}

#[test]
fn test_collect_outputs_requires_every_partition() {
    let (_dir, naming) = setup();
    fs::write(naming.reduce_output("job", 0), encode(&[("a", "1")])).unwrap();

    let result = collect_outputs(&naming, "job", 2);
    assert!(matches!(
        result,
        Err(MergeError::MissingIntermediate { .. })
    ));
}
