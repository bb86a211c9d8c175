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

//! Lock-free rolling-window summaries.
//!
//! A [`TimeWindowSummary`] owns a [`BucketRing`] of [`Bucket`]s. Writers pick
//! the bucket for the current time slice, rotating it if it still holds an
//! older slice, and accumulate into it with atomics only. Readers fold the
//! buckets that are still inside the window into a
//! [`Snapshot`](tally_core::Snapshot).

pub mod bucket;
pub mod ring;
pub mod striped;
pub mod window;

pub use self::bucket::Bucket;
pub use self::ring::BucketRing;
pub use self::window::{TimeWindowSummary, DEFAULT_BUCKET_COUNT};
