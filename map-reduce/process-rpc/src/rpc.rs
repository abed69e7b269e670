// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use map_reduce_core::Task;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Master -> worker
#[derive(Serialize, Deserialize, Debug)]
pub struct DoTaskRequest {
    pub task: Task,
}

/// Worker -> master
#[derive(Serialize, Deserialize, Debug)]
pub struct DoTaskReply {
    pub ok: bool,
}

/// Worker -> master, once the worker is listening
#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub address: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterReply {
    pub accepted: bool,
}

pub type JsonFramed = Framed<TcpStream, LengthDelimitedCodec>;

pub fn json_framed(stream: TcpStream) -> JsonFramed {
    Framed::new(stream, LengthDelimitedCodec::new())
}

pub async fn send_json<T: Serialize>(framed: &mut JsonFramed, message: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec(message)?;
    framed.send(Bytes::from(bytes)).await
}

/// Returns None when the peer closed the connection before sending a frame
pub async fn recv_json<T: DeserializeOwned>(framed: &mut JsonFramed) -> io::Result<Option<T>> {
    match framed.next().await {
        Some(frame) => {
            let frame = frame?;
            let message = serde_json::from_slice(&frame)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            Ok(Some(message))
        }
        None => Ok(None),
    }
}
