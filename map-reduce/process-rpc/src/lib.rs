// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod rpc;

mod rpc_task_invoker;
pub use rpc_task_invoker::RpcTaskInvoker;

mod rpc_worker_server;
pub use rpc_worker_server::RpcWorkerServer;

mod registration;
pub use registration::{register_with_master, RegistrationServer};
