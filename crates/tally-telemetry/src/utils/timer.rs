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

//! Provides RAII-based timers for recording durations into a summary.

use crate::summary::TimeWindowSummary;
use std::time::Instant;

/// Times a scope and records the elapsed milliseconds into a summary when
/// dropped, including on early return or unwinding.
///
/// Elapsed time is measured with [`Instant`], independently of the summary's
/// clock; the summary's clock only decides which bucket receives the value.
#[must_use = "the timer records when dropped; binding it to `_` drops it immediately"]
#[derive(Debug)]
pub struct ScopedSummaryTimer<'a> {
    start: Instant,
    summary: &'a TimeWindowSummary,
    armed: bool,
}

impl<'a> ScopedSummaryTimer<'a> {
    /// Starts a timer for `summary`.
    pub fn new(summary: &'a TimeWindowSummary) -> Self {
        Self {
            start: Instant::now(),
            summary,
            armed: true,
        }
    }

    /// Milliseconds elapsed so far.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Drops the timer without recording anything.
    pub fn discard(mut self) {
        self.armed = false;
    }
}

impl Drop for ScopedSummaryTimer<'_> {
    fn drop(&mut self) {
        if self.armed {
            let elapsed_ms = self.elapsed_ms();
            log::trace!("[ScopedSummaryTimer] Recording {elapsed_ms:.3}ms");
            self.summary.record(elapsed_ms);
        }
    }
}
