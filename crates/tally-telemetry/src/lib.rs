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

//! # Tally Telemetry
//!
//! Lock-free rolling-window summaries and the plumbing to name, time, and
//! report them.
//!
//! - [`summary`]: the bucket ring and the [`TimeWindowSummary`] façade.
//! - [`config`]: serializable summary parameters.
//! - [`registry`]: summaries addressed by [`MetricId`](tally_core::MetricId).
//! - [`service`]: periodic reports of a whole registry.
//! - [`utils`]: RAII timers.

#![warn(missing_docs)]

pub mod config;
pub mod registry;
pub mod service;
pub mod summary;
pub mod utils;

pub use config::SummaryConfig;
pub use registry::{SummaryHandle, SummaryRegistry};
pub use service::{ReportEntry, TelemetryReport, TelemetryService};
pub use summary::{TimeWindowSummary, DEFAULT_BUCKET_COUNT};
pub use utils::timer::ScopedSummaryTimer;
