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

//! Service for periodically reporting every registered summary.

use crate::registry::SummaryRegistry;
use serde::Serialize;
use std::time::Duration;
use tally_core::telemetry::Snapshot;

/// One summary's line in a [`TelemetryReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// The rendered [`MetricId`](tally_core::MetricId).
    pub id: String,
    /// The summary's snapshot at report time.
    pub snapshot: Snapshot,
}

/// Snapshots of every registered summary, taken together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    /// Registry clock reading when the report was built.
    pub taken_at_millis: i64,
    /// One entry per summary, ordered by id.
    pub entries: Vec<ReportEntry>,
}

impl TelemetryReport {
    /// Looks up an entry by rendered id.
    pub fn get(&self, id: &str) -> Option<&Snapshot> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.snapshot)
    }

    /// Renders the report as JSON. Empty-window NaNs become `null`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Drives periodic reporting of a [`SummaryRegistry`].
///
/// Intervals are measured on the registry's clock, so a `ManualClock`
/// makes reporting deterministic in tests.
#[derive(Debug)]
pub struct TelemetryService {
    registry: SummaryRegistry,
    report_interval_millis: i64,
    last_report_millis: i64,
}

impl TelemetryService {
    /// Creates a service that reports `registry` every `report_interval`.
    pub fn new(registry: SummaryRegistry, report_interval: Duration) -> Self {
        let last_report_millis = registry.clock().now_millis();
        Self {
            registry,
            report_interval_millis: i64::try_from(report_interval.as_millis()).unwrap_or(i64::MAX),
            last_report_millis,
        }
    }

    /// Should be called periodically.
    /// Returns a report, and logs it, if the interval has passed.
    pub fn tick(&mut self) -> Option<TelemetryReport> {
        let now = self.registry.clock().now_millis();
        if now.saturating_sub(self.last_report_millis) < self.report_interval_millis {
            return None;
        }

        log::trace!("Reporting all summaries...");
        let report = self.report();
        for entry in &report.entries {
            let s = &entry.snapshot;
            log::debug!(
                "{}: count={} sum={} min={} max={} mean={}",
                entry.id,
                s.count(),
                s.sum(),
                s.min(),
                s.max(),
                s.mean()
            );
        }
        self.last_report_millis = now;
        Some(report)
    }

    /// Builds a report right now, regardless of the interval.
    pub fn report(&self) -> TelemetryReport {
        TelemetryReport {
            taken_at_millis: self.registry.clock().now_millis(),
            entries: self
                .registry
                .snapshot_all()
                .into_iter()
                .map(|(id, snapshot)| ReportEntry {
                    id: id.to_string(),
                    snapshot,
                })
                .collect(),
        }
    }

    /// Returns a reference to the summary registry.
    pub fn registry(&self) -> &SummaryRegistry {
        &self.registry
    }
}
