// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Source of randomness for input generation and crash injection
pub trait Random: Send + Sync {
    fn usize(&self, range: std::ops::Range<usize>) -> usize;

    /// Whether an injected crash happens after the task's work is done
    fn bool(&self) -> bool;

    fn f32(&self) -> f32;

    /// Rolls against `rate`; a rate of zero never consumes a roll
    fn chance(&self, rate: f32) -> bool {
        rate > 0.0 && self.f32() < rate
    }
}

pub struct FastrandRandom;

impl Random for FastrandRandom {
    fn usize(&self, range: std::ops::Range<usize>) -> usize {
        fastrand::usize(range)
    }

    fn bool(&self) -> bool {
        fastrand::bool()
    }

    fn f32(&self) -> f32 {
        fastrand::f32()
    }
}
