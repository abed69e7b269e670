// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::{json_framed, recv_json, send_json, DoTaskReply, DoTaskRequest};
use async_trait::async_trait;
use map_reduce_core::{CallError, Task, TaskInvoker};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// `DoTask` over TCP. Workers are `host:port` addresses.
#[derive(Debug, Clone)]
pub struct RpcTaskInvoker {
    call_timeout: Duration,
}

impl RpcTaskInvoker {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    async fn call(address: &str, task: &Task) -> io::Result<bool> {
        let stream = TcpStream::connect(address).await?;
        let mut framed = json_framed(stream);
        send_json(&mut framed, &DoTaskRequest { task: task.clone() }).await?;

        match recv_json::<DoTaskReply>(&mut framed).await? {
            Some(reply) => Ok(reply.ok),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "worker closed the connection without replying",
            )),
        }
    }
}

#[async_trait]
impl TaskInvoker for RpcTaskInvoker {
    type Worker = String;

    async fn do_task(&self, worker: &String, task: &Task) -> Result<(), CallError> {
        match tokio::time::timeout(self.call_timeout, Self::call(worker, task)).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(CallError::Rejected),
            Ok(Err(e)) => Err(CallError::Transport(e.to_string())),
            Err(_) => Err(CallError::Transport(format!(
                "no reply within {:?}",
                self.call_timeout
            ))),
        }
    }
}
