// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::{json_framed, recv_json, send_json, RegisterReply, RegisterRequest};
use map_reduce_core::WorkerRegistrar;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Master-side listener turning worker registrations into worker feed entries
pub struct RegistrationServer {
    listener: TcpListener,
    registrar: WorkerRegistrar<String>,
    shutdown: CancellationToken,
}

impl RegistrationServer {
    pub async fn bind(registrar: WorkerRegistrar<String>, address: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            listener,
            registrar,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let registrar = self.registrar.clone();
                        tokio::spawn(async move {
                            if let Err(e) = accept_registration(stream, registrar).await {
                                warn!(peer = %peer, error = %e, "registration failed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }
    }
}

async fn accept_registration(
    stream: TcpStream,
    registrar: WorkerRegistrar<String>,
) -> io::Result<()> {
    let mut framed = json_framed(stream);
    let Some(request) = recv_json::<RegisterRequest>(&mut framed).await? else {
        return Ok(());
    };

    let accepted = registrar.register(request.address.clone());
    info!(worker = %request.address, accepted, "worker registered");
    send_json(&mut framed, &RegisterReply { accepted }).await
}

/// Worker side: announces `address` to the master, retrying while the master
/// is not yet listening
pub async fn register_with_master(master: &str, address: &str) -> io::Result<()> {
    let mut attempts = 0;
    loop {
        match try_register(master, address).await {
            Ok(true) => return Ok(()),
            Ok(false) => {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "master refused the registration",
                ))
            }
            Err(e) => {
                attempts += 1;
                if attempts >= 20 {
                    return Err(e);
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

async fn try_register(master: &str, address: &str) -> io::Result<bool> {
    let stream = TcpStream::connect(master).await?;
    let mut framed = json_framed(stream);
    send_json(
        &mut framed,
        &RegisterRequest {
            address: address.to_string(),
        },
    )
    .await?;

    match recv_json::<RegisterReply>(&mut framed).await? {
        Some(reply) => Ok(reply.accepted),
        None => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "master closed the connection without replying",
        )),
    }
}
