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

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tally_core::MetricId;
use tally_telemetry::{SummaryConfig, SummaryRegistry, TelemetryService};

const RUN_FOR: Duration = Duration::from_secs(3);

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let registry = SummaryRegistry::new()?;
    let config = SummaryConfig::from_json(r#"{ "window_ms": 2000, "bucket_count": 20 }"#)?;
    let latency = registry.register(MetricId::new("sandbox", "latency_ms"), &config)?;
    let work = registry.register(MetricId::new("sandbox", "work_ms"), &config)?;

    let mut service = TelemetryService::new(registry, Duration::from_millis(500));
    let running = AtomicBool::new(true);

    thread::scope(|s| {
        for worker in 0..4u64 {
            let (latency, work, running) = (&latency, &work, &running);
            s.spawn(move || {
                let mut i = worker;
                while running.load(Ordering::Relaxed) {
                    // Cheap deterministic jitter in [5, 55) ms.
                    i = i.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    latency.record(5.0 + (i >> 33) as f64 % 50.0);

                    let _timer = work.start_timer();
                    thread::sleep(Duration::from_millis(1 + worker));
                }
            });
        }

        let started = std::time::Instant::now();
        while started.elapsed() < RUN_FOR {
            if let Some(report) = service.tick() {
                match report.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::warn!("Failed to render report: {e}"),
                }
            }
            thread::sleep(Duration::from_millis(50));
        }
        running.store(false, Ordering::Relaxed);
    });

    log::info!("Final report: {}", service.report().to_json()?);
    Ok(())
}
