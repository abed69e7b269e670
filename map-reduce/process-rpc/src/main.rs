// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::{Parser, Subcommand};
use map_reduce_core::{
    ChannelWorkerFeed, JobConfig, JobDriver, TaskExecutor, TaskScheduler, TokioTimer,
};
use map_reduce_process_rpc::{
    register_with_master, RegistrationServer, RpcTaskInvoker, RpcWorkerServer,
};
use map_reduce_word_count::{map_words, sum_counts};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Word count with workers running as separate processes")]
struct Cli {
    /// Job configuration shared by the master and its workers
    #[arg(long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accept worker registrations and run the job over the given inputs
    Master {
        #[arg(long, default_value = "127.0.0.1:7777")]
        listen: String,

        /// Per-call DoTask timeout
        #[arg(long, default_value_t = 30_000)]
        call_timeout_ms: u64,

        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Register with the master and serve DoTask requests
    Worker {
        #[arg(long, default_value = "127.0.0.1:7777")]
        master: String,

        #[arg(long, default_value = "127.0.0.1:0")]
        listen: String,

        /// Die after serving this many tasks
        #[arg(long)]
        task_limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = JobConfig::load_or_default(&cli.config);

    match cli.command {
        Command::Master {
            listen,
            call_timeout_ms,
            inputs,
        } => run_master(config, &listen, call_timeout_ms, inputs).await,
        Command::Worker {
            master,
            listen,
            task_limit,
        } => run_worker(config, &master, &listen, task_limit).await,
    }
}

async fn run_master(
    config: JobConfig,
    listen: &str,
    call_timeout_ms: u64,
    inputs: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(&config.work_dir)?;

    let feed = ChannelWorkerFeed::new();
    let registration = RegistrationServer::bind(feed.registrar(), listen).await?;
    info!(address = %registration.local_addr()?, "master accepting registrations");
    let stop_registration = registration.shutdown_token();
    tokio::spawn(registration.run());

    let scheduler = TaskScheduler::new(
        feed,
        RpcTaskInvoker::new(Duration::from_millis(call_timeout_ms)),
        config.retry.to_policy(),
        TokioTimer,
    );
    let driver = JobDriver::new(scheduler, config.naming(), &config.job_name, config.n_reduce);
    let result = driver.run(&inputs).await;
    stop_registration.cancel();

    let output = result?;
    println!("{}", output.display());
    Ok(())
}

async fn run_worker(
    config: JobConfig,
    master: &str,
    listen: &str,
    task_limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let executor = TaskExecutor::new(config.naming(), config.decode_policy(), map_words, sum_counts);
    let mut server = RpcWorkerServer::bind(executor, listen).await?;
    if let Some(limit) = task_limit {
        server = server.with_task_limit(limit);
    }

    let address = server.local_addr()?.to_string();
    let shutdown = server.shutdown_token();
    let serving = tokio::spawn(server.run());

    if let Err(e) = register_with_master(master, &address).await {
        shutdown.cancel();
        return Err(e.into());
    }
    info!(worker = %address, master, "registered with master");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => shutdown.cancel(),
        _ = shutdown.cancelled() => {}
    }
    serving.await?;
    Ok(())
}
