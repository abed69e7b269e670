// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{BackoffRetryPolicy, DecodePolicy, StreamNaming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// None retries a failing task forever
    pub max_attempts: Option<u32>,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Window without any completed task after which a loop waiting for a
    /// worker gives up. None waits forever.
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Some(20),
            base_backoff_ms: 50,
            max_backoff_ms: 2_000,
            acquire_timeout_ms: Some(30_000),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> BackoffRetryPolicy {
        let policy = BackoffRetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        );
        match self.acquire_timeout_ms {
            Some(ms) => policy.with_acquire_timeout(Duration::from_millis(ms)),
            None => policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub job_name: String,
    /// Directory holding intermediate, reduce output and final output streams
    pub work_dir: PathBuf,
    pub n_reduce: usize,
    pub retry: RetryConfig,
    /// Fail a reduce task on a corrupt intermediate record instead of
    /// dropping the rest of that stream
    pub strict_decoding: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_name: "wordcount".to_string(),
            work_dir: PathBuf::from("mr-work"),
            n_reduce: 3,
            retry: RetryConfig::default(),
            strict_decoding: false,
        }
    }
}

impl JobConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default job configuration");
                Self::default()
            }
        }
    }

    pub fn naming(&self) -> StreamNaming {
        StreamNaming::new(&self.work_dir)
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        if self.strict_decoding {
            DecodePolicy::Strict
        } else {
            DecodePolicy::Lenient
        }
    }
}
