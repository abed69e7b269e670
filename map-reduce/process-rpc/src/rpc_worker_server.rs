// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::{json_framed, recv_json, send_json, DoTaskReply, DoTaskRequest};
use map_reduce_core::TaskExecutor;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Serves `DoTask` requests, one request per connection
pub struct RpcWorkerServer {
    executor: TaskExecutor,
    listener: TcpListener,
    task_limit: Option<usize>,
    shutdown: CancellationToken,
}

impl RpcWorkerServer {
    pub async fn bind(executor: TaskExecutor, address: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            executor,
            listener,
            task_limit: None,
            shutdown: CancellationToken::new(),
        })
    }

    /// Serve at most `limit` tasks, then stop listening as if the worker
    /// process had died. Requests beyond the limit get no reply.
    pub fn with_task_limit(mut self, limit: usize) -> Self {
        self.task_limit = Some(limit);
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) {
        let served = Arc::new(AtomicUsize::new(0));
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let connection = Connection {
                            executor: self.executor.clone(),
                            served: served.clone(),
                            task_limit: self.task_limit,
                            shutdown: self.shutdown.clone(),
                        };
                        tokio::spawn(async move {
                            if let Err(e) = connection.handle(stream).await {
                                warn!(peer = %peer, error = %e, "DoTask connection failed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }
        info!(served = served.load(Ordering::SeqCst), "worker stopped");
    }
}

struct Connection {
    executor: TaskExecutor,
    served: Arc<AtomicUsize>,
    task_limit: Option<usize>,
    shutdown: CancellationToken,
}

impl Connection {
    async fn handle(self, stream: TcpStream) -> io::Result<()> {
        let mut framed = json_framed(stream);
        let Some(request) = recv_json::<DoTaskRequest>(&mut framed).await? else {
            return Ok(());
        };

        let count = self.served.fetch_add(1, Ordering::SeqCst) + 1;
        if self.task_limit.is_some_and(|limit| count > limit) {
            info!(task = request.task.task_index, "task limit reached, shutting down");
            self.shutdown.cancel();
            return Ok(());
        }

        let task = request.task;
        let executor = self.executor;
        let (phase, index) = (task.phase, task.task_index);
        let ok = match tokio::task::spawn_blocking(move || executor.execute(&task)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(%phase, task = index, error = %e, "task failed");
                false
            }
            Err(e) => {
                warn!(%phase, task = index, error = %e, "task panicked");
                false
            }
        };
        info!(%phase, task = index, ok, "DoTask served");
        send_json(&mut framed, &DoTaskReply { ok }).await
    }
}
