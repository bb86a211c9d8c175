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

//! The fixed ring of buckets and its rotation algorithm.

use super::bucket::Bucket;
use std::collections::TryReserveError;

/// Rounds `ts` down to a multiple of `size`, saturating at `i64::MIN`.
#[inline]
pub(crate) fn align_down(ts: i64, size: i64) -> i64 {
    ts.saturating_sub(ts.rem_euclid(size))
}

/// A fixed-size, wrap-around array of [`Bucket`]s addressed by timestamp.
///
/// Slot `i` holds the slice whose bucket number (`floor(ts / size)`) is
/// congruent to `i` modulo the ring length, so the ring wraps every
/// `len * bucket_size_millis` milliseconds. The buckets are allocated once
/// and reused for the lifetime of the ring.
#[derive(Debug)]
pub struct BucketRing {
    buckets: Box<[Bucket]>,
    bucket_size_millis: i64,
}

impl BucketRing {
    /// Allocates `len` buckets, all claiming to start at `initial_start`.
    ///
    /// `len` and `bucket_size_millis` must both be positive, and
    /// `initial_start` should be a multiple of `bucket_size_millis`. Fails
    /// instead of aborting when the slots cannot be allocated.
    pub fn new(
        len: usize,
        bucket_size_millis: i64,
        initial_start: i64,
    ) -> Result<Self, TryReserveError> {
        debug_assert!(len > 0 && bucket_size_millis > 0);
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(len)?;
        buckets.extend((0..len).map(|_| Bucket::new(initial_start)));
        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            bucket_size_millis,
        })
    }

    /// Truncates `ts` down to a multiple of the bucket size.
    ///
    /// Times within one bucket of `i64::MIN` clamp to `i64::MIN`.
    #[inline]
    pub fn aligned_start(&self, ts: i64) -> i64 {
        align_down(ts, self.bucket_size_millis)
    }

    /// The slot addressed by `ts`. Always non-negative, even for negative times.
    #[inline]
    pub fn index_of(&self, ts: i64) -> usize {
        let bucket_number = ts.div_euclid(self.bucket_size_millis);
        bucket_number.rem_euclid(self.buckets.len() as i64) as usize
    }

    /// Returns the bucket for `now`, rotating it first if it holds a stale slice.
    ///
    /// Rotation CASes the bucket's start from the value just read to the new
    /// aligned start. The single winner then resets the accumulators; losers
    /// do not retry and record straight away. A loser's write that lands
    /// between the winner's CAS and its reset is wiped by that reset.
    pub fn bucket_for(&self, now: i64) -> &Bucket {
        let bucket = &self.buckets[self.index_of(now)];
        let aligned = self.aligned_start(now);
        let current = bucket.window_start();

        if aligned.saturating_sub(current) >= self.bucket_size_millis
            && bucket.try_claim(current, aligned)
        {
            log::trace!("Rotating bucket from {current}ms to {aligned}ms");
            bucket.reset_to(aligned);
        }

        bucket
    }

    /// Iterates over every slot, live or stale.
    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the ring has no slots.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The duration one slot covers, in milliseconds.
    pub fn bucket_size_millis(&self) -> i64 {
        self.bucket_size_millis
    }
}
