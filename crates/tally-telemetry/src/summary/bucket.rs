// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single time-sliced accumulator.

use super::striped::{StripedCounter, StripedSum};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

const POS_INF_BITS: u64 = 0x7ff0_0000_0000_0000;
const NEG_INF_BITS: u64 = 0xfff0_0000_0000_0000;

/// Accumulates count, sum, min, and max for one aligned slice of time.
///
/// Every field is updated through its own atomic, so concurrent writers never
/// block each other. A reader may observe a `record` half-applied (say, the
/// count bumped but not yet the sum); that is accepted for monitoring use.
///
/// `min` and `max` are stored as `f64` bit patterns in `AtomicU64`s. The bits
/// are only ever compared after decoding back to `f64`, since raw IEEE-754
/// bit patterns do not order correctly across the sign boundary.
#[derive(Debug)]
pub struct Bucket {
    window_start: AtomicI64,
    count: StripedCounter,
    sum: StripedSum,
    min_bits: AtomicU64,
    max_bits: AtomicU64,
}

impl Bucket {
    /// Creates an empty bucket representing the slice starting at `start_millis`.
    pub fn new(start_millis: i64) -> Self {
        Self {
            window_start: AtomicI64::new(start_millis),
            count: StripedCounter::new(),
            sum: StripedSum::new(),
            min_bits: AtomicU64::new(POS_INF_BITS),
            max_bits: AtomicU64::new(NEG_INF_BITS),
        }
    }

    /// Adds one observation.
    ///
    /// A NaN observation is counted and poisons the sum, but never becomes
    /// the minimum or maximum.
    pub fn record(&self, value: f64) {
        self.count.increment();
        self.sum.add(value);
        self.update_min(value);
        self.update_max(value);
    }

    /// Atomically moves `window_start` from `current` to `aligned`.
    ///
    /// Returns `true` for exactly one caller per transition; that caller owns
    /// the rotation and must follow up with [`Bucket::reset_to`].
    pub fn try_claim(&self, current: i64, aligned: i64) -> bool {
        self.window_start
            .compare_exchange(current, aligned, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clears the accumulators and sets the slice start.
    ///
    /// Only the winner of [`Bucket::try_claim`] may call this; it is not safe
    /// to run concurrently with itself.
    pub fn reset_to(&self, start_millis: i64) {
        self.count.reset();
        self.sum.reset();
        self.min_bits.store(POS_INF_BITS, Ordering::Relaxed);
        self.max_bits.store(NEG_INF_BITS, Ordering::Relaxed);
        self.window_start.store(start_millis, Ordering::Release);
    }

    /// The aligned start of the slice this bucket currently holds.
    #[inline]
    pub fn window_start(&self) -> i64 {
        self.window_start.load(Ordering::Acquire)
    }

    /// Number of observations since the last reset.
    pub fn count(&self) -> u64 {
        self.count.sum()
    }

    /// Sum of observations since the last reset.
    pub fn sum(&self) -> f64 {
        self.sum.sum()
    }

    /// Smallest observation, or `+inf` if empty.
    pub fn min(&self) -> f64 {
        f64::from_bits(self.min_bits.load(Ordering::Relaxed))
    }

    /// Largest observation, or `-inf` if empty.
    pub fn max(&self) -> f64 {
        f64::from_bits(self.max_bits.load(Ordering::Relaxed))
    }

    /// Returns `true` if nothing was recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn update_min(&self, value: f64) {
        let new_bits = value.to_bits();
        let mut current_bits = self.min_bits.load(Ordering::Relaxed);
        // NaN compares false and never enters the loop.
        while value < f64::from_bits(current_bits) {
            match self.min_bits.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current_bits = actual,
            }
        }
    }

    fn update_max(&self, value: f64) {
        let new_bits = value.to_bits();
        let mut current_bits = self.max_bits.load(Ordering::Relaxed);
        while value > f64::from_bits(current_bits) {
            match self.max_bits.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current_bits = actual,
            }
        }
    }
}
