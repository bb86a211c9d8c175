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

//! Serializable summary configuration.

use crate::summary::{TimeWindowSummary, DEFAULT_BUCKET_COUNT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tally_core::clock::{Clock, SystemClock};
use tally_core::telemetry::{SummaryError, SummaryResult};

/// The parameters of a [`TimeWindowSummary`], as they appear in config files.
///
/// ```json
/// { "window_ms": 60000, "bucket_count": 12 }
/// ```
///
/// Both fields are signed and optional so that bad input survives parsing
/// and is rejected by validation with a precise [`SummaryError`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Total retained duration, in milliseconds.
    #[serde(default)]
    pub window_ms: Option<i64>,
    /// Number of ring slots. Defaults to [`DEFAULT_BUCKET_COUNT`].
    #[serde(default)]
    pub bucket_count: Option<i64>,
}

impl SummaryConfig {
    /// A config for `window` split into `bucket_count` slots.
    pub fn new(window: Duration, bucket_count: usize) -> Self {
        Self {
            window_ms: Some(i64::try_from(window.as_millis()).unwrap_or(i64::MAX)),
            bucket_count: Some(i64::try_from(bucket_count).unwrap_or(i64::MAX)),
        }
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Checks the parameters, returning `(window_ms, bucket_count)`.
    pub fn validate(&self) -> SummaryResult<(i64, i64)> {
        let window_ms = self
            .window_ms
            .ok_or_else(|| SummaryError::InvalidWindow("window_ms is missing".to_string()))?;
        if window_ms <= 0 {
            return Err(SummaryError::InvalidWindow(format!(
                "window_ms must be > 0, got {window_ms}"
            )));
        }

        let bucket_count = self.bucket_count.unwrap_or(DEFAULT_BUCKET_COUNT as i64);
        if bucket_count <= 0 {
            return Err(SummaryError::InvalidBucketCount(bucket_count));
        }

        Ok((window_ms, bucket_count))
    }

    /// Builds a summary driven by the system clock.
    pub fn build(&self) -> SummaryResult<TimeWindowSummary> {
        self.build_with_clock(Arc::new(SystemClock::new()?))
    }

    /// Builds a summary reading time from `clock`.
    pub fn build_with_clock(&self, clock: Arc<dyn Clock>) -> SummaryResult<TimeWindowSummary> {
        let (window_ms, bucket_count) = self.validate()?;
        TimeWindowSummary::from_millis(window_ms, bucket_count, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::clock::ManualClock;

    #[test]
    fn parses_full_config() {
        let config = SummaryConfig::from_json(r#"{ "window_ms": 60000, "bucket_count": 12 }"#)
            .unwrap();
        assert_eq!(config, SummaryConfig::new(Duration::from_secs(60), 12));
        assert_eq!(config.validate().unwrap(), (60_000, 12));
    }

    #[test]
    fn bucket_count_defaults_to_ten() {
        let config = SummaryConfig::from_json(r#"{ "window_ms": 1000 }"#).unwrap();
        assert_eq!(config.validate().unwrap(), (1000, 10));

        let summary = config
            .build_with_clock(Arc::new(ManualClock::starting_at(0)))
            .unwrap();
        assert_eq!(summary.bucket_size_millis(), 100);
    }

    #[test]
    fn missing_window_is_invalid() {
        let config = SummaryConfig::from_json("{}").unwrap();
        assert!(matches!(
            config.validate(),
            Err(SummaryError::InvalidWindow(msg)) if msg.contains("missing")
        ));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let zero_window = SummaryConfig {
            window_ms: Some(0),
            bucket_count: Some(3),
        };
        assert!(matches!(
            zero_window.validate(),
            Err(SummaryError::InvalidWindow(_))
        ));

        let negative_count = SummaryConfig::from_json(r#"{ "window_ms": 300, "bucket_count": -2 }"#)
            .unwrap();
        assert_eq!(
            negative_count
                .build_with_clock(Arc::new(ManualClock::starting_at(0)))
                .unwrap_err(),
            SummaryError::InvalidBucketCount(-2)
        );
    }

    #[test]
    fn oversized_bucket_count_builds_a_bounded_ring() {
        let config =
            SummaryConfig::from_json(r#"{ "window_ms": 1000, "bucket_count": 9223372036854775807 }"#)
                .unwrap();
        assert_eq!(config.validate().unwrap(), (1000, i64::MAX));

        let summary = config
            .build_with_clock(Arc::new(ManualClock::starting_at(0)))
            .unwrap();
        assert_eq!(summary.bucket_size_millis(), 1);
        assert_eq!(summary.bucket_count(), 1001);

        summary.record(7.0);
        assert_eq!(summary.snapshot().count(), 1);
    }

    #[test]
    fn unallocatable_bucket_count_is_an_error() {
        let config = SummaryConfig {
            window_ms: Some(i64::MAX),
            bucket_count: Some(i64::MAX / 2),
        };
        assert_eq!(
            config
                .build_with_clock(Arc::new(ManualClock::starting_at(0)))
                .unwrap_err(),
            SummaryError::InvalidBucketCount(i64::MAX / 2)
        );
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        assert!(SummaryConfig::from_json(r#"{ "window_ms": 300, "buckets": 3 }"#).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = SummaryConfig::new(Duration::from_millis(500), 5);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"window_ms":500,"bucket_count":5}"#);
    }
}
