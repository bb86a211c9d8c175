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

//! Registry of named summaries.

use crate::config::SummaryConfig;
use crate::summary::TimeWindowSummary;
use crate::utils::timer::ScopedSummaryTimer;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tally_core::clock::{Clock, SystemClock};
use tally_core::telemetry::{MetricId, RegistryError, RegistryResult, Snapshot, SummaryResult};

/// Central registry for the summaries of a process.
///
/// The registry owns the clock every summary it builds will read, and a
/// name table guarded by a `RwLock`. Only registration and lookup touch the
/// lock: a [`SummaryHandle`] records straight into its summary.
#[derive(Debug)]
pub struct SummaryRegistry {
    clock: Arc<dyn Clock>,
    summaries: RwLock<HashMap<MetricId, SummaryHandle>>,
}

impl SummaryRegistry {
    /// Creates a registry whose summaries read the system clock.
    pub fn new() -> SummaryResult<Self> {
        Ok(Self::with_clock(Arc::new(SystemClock::new()?)))
    }

    /// Creates a registry whose summaries all share `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            summaries: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a summary from `config` and registers it under `id`.
    pub fn register(&self, id: MetricId, config: &SummaryConfig) -> RegistryResult<SummaryHandle> {
        let mut summaries = self
            .summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if summaries.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        let summary = config.build_with_clock(Arc::clone(&self.clock))?;
        let handle = SummaryHandle::new(id.clone(), Arc::new(summary));
        summaries.insert(id, handle.clone());

        log::info!(
            "Registered summary: {} (window={}ms, buckets={})",
            handle.id(),
            handle.summary().window().as_millis(),
            handle.summary().bucket_count()
        );
        Ok(handle)
    }

    /// Returns the handle registered under `id`.
    pub fn get(&self, id: &MetricId) -> RegistryResult<SummaryHandle> {
        self.summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Checks whether `id` is registered.
    pub fn contains(&self, id: &MetricId) -> bool {
        self.summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Unregisters `id`. Outstanding handles keep working but are no longer reported.
    pub fn remove(&self, id: &MetricId) -> RegistryResult<SummaryHandle> {
        let removed = self
            .summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        log::debug!("Removed summary: {id}");
        Ok(removed)
    }

    /// Number of registered summaries.
    pub fn len(&self) -> usize {
        self.summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregisters everything.
    pub fn clear(&self) {
        self.summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Snapshots every registered summary, ordered by rendered id.
    pub fn snapshot_all(&self) -> Vec<(MetricId, Snapshot)> {
        self.collect(|_| true)
    }

    /// Snapshots the summaries in `namespace`, ordered by rendered id.
    pub fn snapshot_namespace(&self, namespace: &str) -> Vec<(MetricId, Snapshot)> {
        self.collect(|id| id.namespace() == namespace)
    }

    /// The clock shared by every summary in this registry.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn collect(&self, filter: impl Fn(&MetricId) -> bool) -> Vec<(MetricId, Snapshot)> {
        // Clone the handles out so snapshots are taken without holding the lock.
        let handles: Vec<SummaryHandle> = self
            .summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|h| filter(h.id()))
            .cloned()
            .collect();

        let mut out: Vec<_> = handles
            .into_iter()
            .map(|h| (h.id.clone(), h.snapshot()))
            .collect();
        out.sort_by_cached_key(|(id, _)| id.to_string());
        out
    }
}

/// A cheap, clonable reference to a registered summary.
#[derive(Debug, Clone)]
pub struct SummaryHandle {
    id: MetricId,
    summary: Arc<TimeWindowSummary>,
}

impl SummaryHandle {
    fn new(id: MetricId, summary: Arc<TimeWindowSummary>) -> Self {
        Self { id, summary }
    }

    /// Records one observation.
    #[inline]
    pub fn record(&self, value: f64) {
        self.summary.record(value);
    }

    /// Snapshots the summary.
    pub fn snapshot(&self) -> Snapshot {
        self.summary.snapshot()
    }

    /// Starts a timer that records its elapsed milliseconds when dropped.
    pub fn start_timer(&self) -> ScopedSummaryTimer<'_> {
        ScopedSummaryTimer::new(&self.summary)
    }

    /// The id this handle was registered under.
    pub fn id(&self) -> &MetricId {
        &self.id
    }

    /// The underlying summary.
    pub fn summary(&self) -> &Arc<TimeWindowSummary> {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tally_core::clock::ManualClock;
    use tally_core::telemetry::SummaryError;

    fn registry() -> (Arc<ManualClock>, SummaryRegistry) {
        let clock = Arc::new(ManualClock::starting_at(0));
        (clock.clone(), SummaryRegistry::with_clock(clock))
    }

    fn one_second() -> SummaryConfig {
        SummaryConfig::new(Duration::from_secs(1), 10)
    }

    #[test]
    fn new_registry_is_empty() {
        let (_, registry) = registry();
        assert!(registry.is_empty());
        assert!(registry.snapshot_all().is_empty());
    }

    #[test]
    fn register_and_record_through_handle() {
        let (_, registry) = registry();
        let id = MetricId::new("http", "latency_ms");
        let handle = registry.register(id.clone(), &one_second()).unwrap();

        handle.record(12.0);
        handle.record(18.0);

        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
        let looked_up = registry.get(&id).unwrap();
        assert_eq!(looked_up.snapshot().mean(), 15.0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (_, registry) = registry();
        let id = MetricId::new("http", "latency_ms");
        registry.register(id.clone(), &one_second()).unwrap();

        assert_eq!(
            registry.register(id.clone(), &one_second()).unwrap_err(),
            RegistryError::AlreadyRegistered(id)
        );
    }

    #[test]
    fn invalid_config_surfaces_summary_error() {
        let (_, registry) = registry();
        let config = SummaryConfig {
            window_ms: Some(1000),
            bucket_count: Some(0),
        };
        assert_eq!(
            registry
                .register(MetricId::new("db", "query_ms"), &config)
                .unwrap_err(),
            RegistryError::Summary(SummaryError::InvalidBucketCount(0))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn unallocatable_config_fails_and_leaves_the_registry_usable() {
        let (_, registry) = registry();
        let config = SummaryConfig {
            window_ms: Some(i64::MAX),
            bucket_count: Some(i64::MAX / 2),
        };
        let err = registry
            .register(MetricId::new("http", "latency_ms"), &config)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Summary(SummaryError::InvalidBucketCount(i64::MAX / 2))
        );

        assert!(registry.is_empty());
        registry
            .register(MetricId::new("http", "latency_ms"), &one_second())
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_and_removed_ids_are_not_found() {
        let (_, registry) = registry();
        let id = MetricId::new("db", "query_ms");
        assert_eq!(
            registry.get(&id).unwrap_err(),
            RegistryError::NotFound(id.clone())
        );

        let handle = registry.register(id.clone(), &one_second()).unwrap();
        registry.remove(&id).unwrap();
        assert!(!registry.contains(&id));
        assert!(registry.remove(&id).is_err());

        // The detached handle keeps accumulating.
        handle.record(1.0);
        assert_eq!(handle.snapshot().count(), 1);
    }

    #[test]
    fn summaries_share_the_registry_clock() {
        let (clock, registry) = registry();
        let handle = registry
            .register(MetricId::new("http", "latency_ms"), &one_second())
            .unwrap();

        handle.record(3.0);
        clock.set_millis(2_000);
        assert!(handle.snapshot().is_empty());
    }

    #[test]
    fn snapshots_are_sorted_and_filterable() {
        let (_, registry) = registry();
        for (ns, name) in [("http", "size_bytes"), ("db", "query_ms"), ("http", "latency_ms")] {
            registry
                .register(MetricId::new(ns, name), &one_second())
                .unwrap()
                .record(1.0);
        }

        let all: Vec<String> = registry
            .snapshot_all()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(all, ["db:query_ms", "http:latency_ms", "http:size_bytes"]);

        let http = registry.snapshot_namespace("http");
        assert_eq!(http.len(), 2);
        assert!(http.iter().all(|(_, snap)| snap.count() == 1));

        registry.clear();
        assert!(registry.is_empty());
    }
}
