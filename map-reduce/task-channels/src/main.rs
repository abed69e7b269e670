// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use map_reduce_core::{
    ChannelWorkerFeed, JobConfig, JobDriver, TaskExecutor, TaskScheduler, TokioTimer,
};
use map_reduce_task_channels::{generate_inputs, generate_vocabulary, FastrandRandom, LocalTaskInvoker};
use map_reduce_word_count::{map_words, sum_counts};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Word count over generated input files, with workers running as tokio tasks
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Workers that register but never answer
    #[arg(long, default_value_t = 1)]
    down_workers: usize,

    /// Probability that any single DoTask call crashes
    #[arg(long, default_value_t = 0.1)]
    failure_rate: f32,

    #[arg(long, default_value_t = 8)]
    files: usize,

    #[arg(long, default_value_t = 10_000)]
    words_per_file: usize,

    #[arg(long, default_value_t = 200)]
    vocabulary: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let start_time = Instant::now();
    let args = Args::parse();
    let config = JobConfig::load_or_default(&args.config);
    fs::create_dir_all(&config.work_dir)?;

    println!("=== MAP-REDUCE WORD COUNT ===");
    println!("Configuration:");
    println!("  - Job: {}", config.job_name);
    println!("  - Work dir: {}", config.work_dir.display());
    println!("  - Reduce tasks: {}", config.n_reduce);
    println!("  - Input files: {}", args.files);
    println!("  - Workers: {} ({} down)", args.workers, args.down_workers);
    println!("  - Failure rate: {}", args.failure_rate);

    let random = FastrandRandom;
    let vocabulary = generate_vocabulary(&random, args.vocabulary, 8);
    let inputs = generate_inputs(
        &config.work_dir.join("inputs"),
        args.files,
        args.words_per_file,
        &vocabulary,
        &random,
    )?;
    info!(files = inputs.len(), "generated inputs");

    let feed = ChannelWorkerFeed::new();
    let registrar = feed.registrar();
    let executor = TaskExecutor::new(config.naming(), config.decode_policy(), map_words, sum_counts);
    let invoker = LocalTaskInvoker::new(executor, FastrandRandom)
        .with_down_workers((0..args.down_workers).map(|i| format!("worker-{}", i)))
        .with_failure_rate(args.failure_rate)
        .with_restarts(registrar.clone(), Duration::from_millis(100));

    // workers trickle in while the map phase is already running
    let workers = args.workers;
    tokio::spawn(async move {
        for i in 0..workers {
            registrar.register(format!("worker-{}", i));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let scheduler = TaskScheduler::new(feed, invoker, config.retry.to_policy(), TokioTimer);
    let driver = JobDriver::new(scheduler, config.naming(), &config.job_name, config.n_reduce);
    let output = driver.run(&inputs).await?;

    let contents = fs::read_to_string(&output)?;
    let mut counts: Vec<(&str, u64)> = contents
        .lines()
        .filter_map(|line| line.split_once(": "))
        .map(|(word, count)| (word, count.parse().unwrap_or(0)))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("\n=== RESULTS ===");
    for (word, count) in counts.iter().take(20) {
        println!("{}: {}", word, count);
    }
    if counts.len() > 20 {
        println!("... ({} more words)", counts.len() - 20);
    }
    let total: u64 = counts.iter().map(|(_, c)| c).sum();
    println!("\nTotal words counted: {}", total);
    println!("Output: {}", output.display());

    println!("\n=== PROGRAM COMPLETE ===");
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
