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

//! Pluggable millisecond time sources.
//!
//! Every rolling-window computation reads the time through the [`Clock`]
//! capability so tests can drive bucket rotation and window cutoffs
//! deterministically with a [`ManualClock`].

use crate::telemetry::{SummaryError, SummaryResult};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A source of the current time, in milliseconds.
///
/// Implementations must be cheap to call and safe to share between threads;
/// the summary reads the clock on every `record` and `snapshot`.
pub trait Clock: Send + Sync + Debug + 'static {
    /// Returns the current time in milliseconds.
    fn now_millis(&self) -> i64;
}

/// The production clock: Unix-epoch milliseconds that never run backwards.
///
/// The wall clock is sampled once at construction; after that, time advances
/// by a monotonic [`Instant`], so NTP adjustments cannot move readings back.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch_millis: i64,
    origin: Instant,
}

impl SystemClock {
    /// Anchors a new clock to the current wall-clock time.
    ///
    /// Fails with [`SummaryError::MissingClock`] when the wall clock reports a
    /// time before the Unix epoch.
    pub fn new() -> SummaryResult<Self> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SummaryError::MissingClock(format!("system time before Unix epoch: {e}")))?;
        let epoch_millis = i64::try_from(since_epoch.as_millis()).map_err(|_| {
            SummaryError::MissingClock("system time does not fit in i64 milliseconds".to_string())
        })?;

        Ok(Self {
            epoch_millis,
            origin: Instant::now(),
        })
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        let elapsed = self.origin.elapsed().as_millis();
        self.epoch_millis
            .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}

/// A clock whose time only moves when told to.
///
/// Backed by an atomic so a single instance can be shared (via `Arc`) between
/// the summary under test and the threads driving it.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `millis`.
    pub fn starting_at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Moves the clock to an absolute time.
    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::Release);
    }

    /// Moves the clock forward (or backward, for a negative delta).
    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::Acquire)
    }
}
