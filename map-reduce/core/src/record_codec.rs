// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Newline-delimited JSON encoding of `KeyValue` streams.
//!
//! A reader stops at one of three endings:
//! - clean end of stream,
//! - a truncated final record (always treated as end of stream),
//! - a corrupted record, handled according to [`DecodePolicy`].

use crate::{KeyValue, MergeError};
use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::warn;

/// What to do with a record that is present but cannot be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodePolicy {
    /// Stop reading and keep the records decoded so far
    #[default]
    Lenient,
    /// Fail the read with `MergeError::CorruptRecord`
    Strict,
}

pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write(&mut self, record: &KeyValue) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")
    }
}

pub struct RecordReader<R: Read> {
    records: StreamDeserializer<'static, IoRead<R>, KeyValue>,
    path: PathBuf,
    policy: DecodePolicy,
    decoded: usize,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    /// `path` only labels log lines and errors
    pub fn new(reader: R, path: impl Into<PathBuf>, policy: DecodePolicy) -> Self {
        Self {
            records: serde_json::Deserializer::from_reader(reader).into_iter::<KeyValue>(),
            path: path.into(),
            policy,
            decoded: 0,
            finished: false,
        }
    }

    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<KeyValue, MergeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.records.next() {
            Some(Ok(record)) => {
                self.decoded += 1;
                Some(Ok(record))
            }
            None => {
                self.finished = true;
                None
            }
            Some(Err(err)) => {
                self.finished = true;
                if err.is_eof() {
                    warn!(
                        path = %self.path.display(),
                        records = self.decoded,
                        "truncated record at end of stream, ignoring it"
                    );
                    return None;
                }

                match self.policy {
                    DecodePolicy::Lenient => {
                        warn!(
                            path = %self.path.display(),
                            records = self.decoded,
                            error = %err,
                            "corrupt record, treating as end of stream"
                        );
                        None
                    }
                    DecodePolicy::Strict => Some(Err(MergeError::CorruptRecord {
                        path: self.path.clone(),
                        record: self.decoded,
                        source: err,
                    })),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str, policy: DecodePolicy) -> Result<Vec<KeyValue>, MergeError> {
        RecordReader::new(input.as_bytes(), "test", policy).collect()
    }

    #[test]
    fn test_writer_emits_one_line_per_record() {
        let mut buffer = Vec::new();
        let mut writer = RecordWriter::new(&mut buffer);
        writer.write(&KeyValue::new("cat", "1")).unwrap();
        writer.write(&KeyValue::new("dog", "2")).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "{\"Key\":\"cat\",\"Value\":\"1\"}\n{\"Key\":\"dog\",\"Value\":\"2\"}\n"
        );
    }

    #[test]
    fn test_empty_stream_has_no_records() {
        assert!(read_all("", DecodePolicy::Strict).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_tail_is_end_of_stream_even_when_strict() {
        let input = "{\"Key\":\"a\",\"Value\":\"1\"}\n{\"Key\":\"b\",\"Va";
        let records = read_all(input, DecodePolicy::Strict).unwrap();
        assert_eq!(records, vec![KeyValue::new("a", "1")]);
    }

    #[test]
    fn test_corruption_is_end_of_stream_when_lenient() {
        let input = "{\"Key\":\"a\",\"Value\":\"1\"}\ngarbage\n{\"Key\":\"b\",\"Value\":\"2\"}\n";
        let records = read_all(input, DecodePolicy::Lenient).unwrap();
        assert_eq!(records, vec![KeyValue::new("a", "1")]);
    }

    #[test]
    fn test_corruption_fails_when_strict() {
        let input = "{\"Key\":\"a\",\"Value\":\"1\"}\n{\"Wrong\":1}\n";
        let result = read_all(input, DecodePolicy::Strict);
        assert!(matches!(
            result,
            Err(MergeError::CorruptRecord { record: 1, .. })
        ));
    }
}
