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

//! Striped additive accumulators.
//!
//! A single atomic hammered by every writer turns into a cache-line ping-pong.
//! These accumulators spread writes over [`STRIPES`] cache-padded cells,
//! picked per thread, and add the cells up on read.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Number of cells per accumulator.
pub const STRIPES: usize = 8;

static NEXT_STRIPE: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static STRIPE: usize = NEXT_STRIPE.fetch_add(1, Ordering::Relaxed) % STRIPES;
}

#[inline]
fn stripe() -> usize {
    STRIPE.with(|s| *s)
}

fn cells() -> [CachePadded<AtomicU64>; STRIPES] {
    std::array::from_fn(|_| CachePadded::new(AtomicU64::new(0)))
}

/// An unsigned counter whose increments are never lost.
#[derive(Debug)]
pub struct StripedCounter {
    cells: [CachePadded<AtomicU64>; STRIPES],
}

impl StripedCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self { cells: cells() }
    }

    /// Adds one.
    #[inline]
    pub fn increment(&self) {
        self.cells[stripe()].fetch_add(1, Ordering::Relaxed);
    }

    /// Sums every cell. Not a linearizable read under concurrent increments.
    pub fn sum(&self) -> u64 {
        self.cells
            .iter()
            .fold(0u64, |acc, c| acc.wrapping_add(c.load(Ordering::Relaxed)))
    }

    /// Zeroes every cell.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for StripedCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A floating-point accumulator; each cell holds an `f64` bit pattern.
#[derive(Debug)]
pub struct StripedSum {
    cells: [CachePadded<AtomicU64>; STRIPES],
}

impl StripedSum {
    /// Creates an accumulator at `0.0` (whose bit pattern is all zeroes).
    pub fn new() -> Self {
        Self { cells: cells() }
    }

    /// Adds `value` to this thread's cell with a CAS loop.
    #[inline]
    pub fn add(&self, value: f64) {
        let cell = &self.cells[stripe()];
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Sums every cell.
    pub fn sum(&self) -> f64 {
        self.cells
            .iter()
            .map(|c| f64::from_bits(c.load(Ordering::Relaxed)))
            .sum()
    }

    /// Resets every cell to `0.0`.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(0.0f64.to_bits(), Ordering::Relaxed);
        }
    }
}

impl Default for StripedSum {
    fn default() -> Self {
        Self::new()
    }
}
