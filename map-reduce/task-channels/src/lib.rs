// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod random;
pub use random::{FastrandRandom, Random};

pub mod input_generator;
pub use input_generator::{generate_inputs, generate_vocabulary};

mod local_task_invoker;
pub use local_task_invoker::LocalTaskInvoker;
