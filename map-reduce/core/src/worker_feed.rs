// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Shared pool of idle workers.
/// Consumed by every task loop, refilled by registrations and by the
/// scheduler after a successful task.
#[async_trait]
pub trait WorkerFeed: Send + Sync + 'static {
    type Worker: Display + Send + Sync + 'static;

    /// Waits for the next idle worker.
    /// Returns None once no worker can ever arrive again.
    async fn next_worker(&self) -> Option<Self::Worker>;

    /// Returns a worker to the pool. Must not block.
    fn hand_back(&self, worker: Self::Worker);
}

/// Producer half of a `ChannelWorkerFeed`, handed to whatever discovers
/// new workers
pub struct WorkerRegistrar<W> {
    tx: mpsc::UnboundedSender<W>,
}

impl<W> Clone for WorkerRegistrar<W> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<W> WorkerRegistrar<W> {
    /// Returns false if the feed has been dropped
    pub fn register(&self, worker: W) -> bool {
        self.tx.send(worker).is_ok()
    }
}

/// Worker feed backed by an unbounded tokio channel, so hand-backs never
/// wait for capacity
pub struct ChannelWorkerFeed<W> {
    registrar: WorkerRegistrar<W>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<W>>>,
}

impl<W> ChannelWorkerFeed<W> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            registrar: WorkerRegistrar { tx },
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn with_workers(workers: impl IntoIterator<Item = W>) -> Self {
        let feed = Self::new();
        for worker in workers {
            feed.registrar.register(worker);
        }
        feed
    }

    pub fn registrar(&self) -> WorkerRegistrar<W> {
        self.registrar.clone()
    }
}

impl<W> Default for ChannelWorkerFeed<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<W> WorkerFeed for ChannelWorkerFeed<W>
where
    W: Display + Send + Sync + 'static,
{
    type Worker = W;

    async fn next_worker(&self) -> Option<W> {
        self.rx.lock().await.recv().await
    }

    fn hand_back(&self, worker: W) {
        self.registrar.register(worker);
    }
}
