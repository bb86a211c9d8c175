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

//! The rolling-window summary façade.

use super::ring::{align_down, BucketRing};
use std::sync::Arc;
use std::time::Duration;
use tally_core::clock::{Clock, SystemClock};
use tally_core::telemetry::{Snapshot, SummaryError, SummaryResult};

/// Bucket count used by [`TimeWindowSummary::with_window`].
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Lock-free count, sum, min, max, and mean over a trailing time window.
///
/// Observations go into a ring of time-sliced buckets; a snapshot folds
/// every bucket whose slice still starts inside the window. Nothing is
/// allocated after construction and neither [`record`](Self::record) nor
/// [`snapshot`](Self::snapshot) ever blocks.
///
/// ```rust,ignore
/// let latency = TimeWindowSummary::new(Duration::from_secs(60), 12)?;
/// latency.record(120.0);
/// latency.record(80.0);
/// assert_eq!(latency.snapshot().mean(), 100.0);
/// ```
#[derive(Debug)]
pub struct TimeWindowSummary {
    window_millis: i64,
    ring: BucketRing,
    clock: Arc<dyn Clock>,
}

impl TimeWindowSummary {
    /// Creates a summary driven by the system clock.
    pub fn new(window: Duration, bucket_count: usize) -> SummaryResult<Self> {
        let clock = SystemClock::new()?;
        Self::with_clock(window, bucket_count, Arc::new(clock))
    }

    /// Creates a summary with [`DEFAULT_BUCKET_COUNT`] buckets and the system clock.
    pub fn with_window(window: Duration) -> SummaryResult<Self> {
        Self::new(window, DEFAULT_BUCKET_COUNT)
    }

    /// Creates a summary reading time from `clock`.
    ///
    /// The window must be non-zero and `bucket_count` must be positive. A
    /// window shorter than one millisecond is rounded up to one.
    pub fn with_clock(
        window: Duration,
        bucket_count: usize,
        clock: Arc<dyn Clock>,
    ) -> SummaryResult<Self> {
        if window.is_zero() {
            return Err(SummaryError::InvalidWindow("window must be > 0".to_string()));
        }
        let window_millis = i64::try_from(window.as_millis().max(1)).unwrap_or(i64::MAX);
        let bucket_count = i64::try_from(bucket_count).unwrap_or(i64::MAX);
        Self::from_millis(window_millis, bucket_count, clock)
    }

    /// Validates raw millisecond/count parameters and builds the ring.
    ///
    /// When `bucket_count` exceeds `window_millis` every slot covers 1 ms, and
    /// only `window_millis + 1` of them can ever hold in-window data, so the
    /// ring is capped at that length.
    pub(crate) fn from_millis(
        window_millis: i64,
        bucket_count: i64,
        clock: Arc<dyn Clock>,
    ) -> SummaryResult<Self> {
        if window_millis <= 0 {
            return Err(SummaryError::InvalidWindow(format!(
                "window must be > 0, got {window_millis} ms"
            )));
        }
        if bucket_count <= 0 {
            return Err(SummaryError::InvalidBucketCount(bucket_count));
        }

        let bucket_size_millis = (window_millis / bucket_count).max(1);
        let slots = bucket_count.min(window_millis.saturating_add(1));
        let slots =
            usize::try_from(slots).map_err(|_| SummaryError::InvalidBucketCount(bucket_count))?;

        // Seed every slot on a bucket boundary older than the window so it
        // reads as expired and the first record into it rotates.
        let now = clock.now_millis();
        let initial_start = align_down(
            now.saturating_sub(window_millis)
                .saturating_sub(bucket_size_millis),
            bucket_size_millis,
        );

        let ring = BucketRing::new(slots, bucket_size_millis, initial_start).map_err(|e| {
            log::warn!("Cannot allocate {slots} buckets: {e}");
            SummaryError::InvalidBucketCount(bucket_count)
        })?;

        log::debug!(
            "Created time-window summary: window={window_millis}ms, buckets={slots}, bucket_size={bucket_size_millis}ms"
        );

        Ok(Self {
            window_millis,
            ring,
            clock,
        })
    }

    /// Records one observation into the bucket for the current time.
    pub fn record(&self, value: f64) {
        let now = self.clock.now_millis();
        self.ring.bucket_for(now).record(value);
    }

    /// Aggregates every non-empty bucket whose slice starts within the window.
    ///
    /// Concurrent writers are not paused, so the result is "as of roughly
    /// now" rather than an exact point-in-time view.
    pub fn snapshot(&self) -> Snapshot {
        let cutoff = self.clock.now_millis().saturating_sub(self.window_millis);

        let mut count = 0u64;
        let mut sum = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for bucket in self.ring.iter() {
            if bucket.window_start() < cutoff {
                continue;
            }
            let c = bucket.count();
            if c == 0 {
                continue;
            }

            count += c;
            sum += bucket.sum();
            min = min.min(bucket.min());
            max = max.max(bucket.max());
        }

        Snapshot::from_totals(count, sum, min, max)
    }

    /// The retained duration.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis as u64)
    }

    /// Number of ring slots, after capping at `window + 1` one-millisecond slots.
    pub fn bucket_count(&self) -> usize {
        self.ring.len()
    }

    /// Duration covered by one slot, in milliseconds.
    pub fn bucket_size_millis(&self) -> i64 {
        self.ring.bucket_size_millis()
    }

    /// The time source this summary reads.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
