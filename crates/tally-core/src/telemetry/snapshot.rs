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

//! The immutable result of aggregating a rolling window.

use serde::Serialize;

/// A point-in-time view of count, sum, min, max, and mean over a window.
///
/// When no observation falls inside the window, `count` is 0, `sum` is 0.0,
/// and `min`, `max`, and `mean` are NaN, so "no data" can never be mistaken
/// for a real zero. Serialized to JSON, those NaN fields render as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    mean: f64,
}

impl Snapshot {
    /// Builds a snapshot from folded totals, applying the empty-window rules.
    pub fn from_totals(count: u64, sum: f64, min: f64, max: f64) -> Self {
        if count == 0 {
            return Self::empty();
        }
        Self {
            count,
            sum,
            min,
            max,
            mean: sum / count as f64,
        }
    }

    /// The snapshot of a window with no observations.
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
        }
    }

    /// Number of observations in the window.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of the observations.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest observation, or NaN if the window is empty.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest observation, or NaN if the window is empty.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean (`sum / count`), or NaN if the window is empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns `true` if no observation was aggregated.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
