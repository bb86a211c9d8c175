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

//! Provides the data types and error contracts for rolling-window summaries.
//!
//! This module defines the "common language" between the code that records
//! observations and the code that reports them: how a summary is named
//! ([`MetricId`]), what a reader gets back ([`Snapshot`]), and what can go
//! wrong while building one ([`SummaryError`], [`RegistryError`]).

pub mod error;
pub mod metric_id;
pub mod snapshot;

pub use self::error::{RegistryError, RegistryResult, SummaryError, SummaryResult};
pub use self::metric_id::MetricId;
pub use self::snapshot::Snapshot;
