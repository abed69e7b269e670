// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod phase;
pub use phase::Phase;

mod key_value;
pub use key_value::KeyValue;

mod task;
pub use task::{phase_counts, plan_tasks, Task};

mod stream_naming;
pub use stream_naming::StreamNaming;

mod schedule_error;
pub use schedule_error::ScheduleError;

mod merge_error;
pub use merge_error::MergeError;

mod call_error;
pub use call_error::CallError;

mod map_error;
pub use map_error::MapError;

pub mod atomic_file;

pub mod record_codec;
pub use record_codec::{DecodePolicy, RecordReader, RecordWriter};

mod reduce_merger;
pub use reduce_merger::{GroupedValues, ReduceMerger};

mod map_task_writer;
pub use map_task_writer::{ihash, MapTaskWriter};

mod output_collector;
pub use output_collector::collect_outputs;

mod task_executor;
pub use task_executor::{CombineFn, MapFn, TaskExecutionError, TaskExecutor};

pub mod worker_feed;
pub use worker_feed::{ChannelWorkerFeed, WorkerFeed, WorkerRegistrar};

mod task_invoker;
pub use task_invoker::TaskInvoker;

pub mod retry_policy;
pub use retry_policy::{BackoffRetryPolicy, RetryPolicy};

pub mod timer;
pub use timer::{Timer, TokioTimer};

mod task_scheduler;
pub use task_scheduler::{PhaseReport, TaskScheduler};

mod job_driver;
pub use job_driver::{JobDriver, JobError};

pub mod config;
pub use config::{ConfigError, JobConfig, RetryConfig};
