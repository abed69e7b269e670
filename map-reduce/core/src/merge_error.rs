// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    /// A required map output is absent or unreadable. Recovering from this
    /// means re-running the map task that should have produced it.
    #[error("cannot open intermediate stream {}: {source}", .path.display())]
    MissingIntermediate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only produced under `DecodePolicy::Strict`
    #[error("corrupt record #{record} in {}: {source}", .path.display())]
    CorruptRecord {
        path: PathBuf,
        record: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
