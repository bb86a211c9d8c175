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

//! Error types for summary construction and registration.
//!
//! Recording and snapshotting are infallible; every error here is raised
//! synchronously while a summary is being built or looked up.

use super::metric_id::MetricId;

/// A specialized `Result` type for summary construction.
pub type SummaryResult<T> = Result<T, SummaryError>;

/// A specialized `Result` type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A configuration error that prevents a summary from being constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// The window duration is missing, zero, or negative.
    #[error("invalid window: {0}")]
    InvalidWindow(String),
    /// The bucket count is zero, negative, or too large to allocate.
    #[error("invalid bucket count {0}: must be > 0 and allocatable")]
    InvalidBucketCount(i64),
    /// No usable time source could be established.
    #[error("no usable clock: {0}")]
    MissingClock(String),
}

/// An error raised by a summary registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A summary with this id is already registered.
    #[error("summary already registered: {0}")]
    AlreadyRegistered(MetricId),
    /// No summary with this id is registered.
    #[error("summary not found: {0}")]
    NotFound(MetricId),
    /// The summary could not be built from its configuration.
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
