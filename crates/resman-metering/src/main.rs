//! Resman Monitor
//!
//! Polls the local host's network counters and utilization and logs them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resman_metering::{CounterSampler, HistogramAggregator, HostProbe, MonitorConfig, ProcNetDev};

/// One row of an exported access log
#[derive(Debug, Deserialize)]
struct AccessLogRow {
    category: String,
    timestamp: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resman Monitor v{}", resman_common::VERSION);

    let config = MonitorConfig::load().context("loading monitor configuration")?;
    info!("Loaded configuration: {:?}", config);

    if let Some(path) = &config.access_log_path {
        if let Err(e) = chart_access_log(path) {
            warn!("Could not chart access log {}: {:#}", path.display(), e);
        }
    }

    let source = ProcNetDev::new(&config.net_dev_path);
    let sampler = CounterSampler::new();
    let probe = HostProbe::new(&config.stat_path, &config.meminfo_path);

    // Seed both baselines so the first tick reports a real interval
    if let Err(e) = sampler.sample_from(&source) {
        warn!("Initial network sample failed: {}", e);
    }
    if let Err(e) = probe.performance() {
        warn!("Initial host sample failed: {}", e);
    }

    let mut interval = tokio::time::interval(config.poll_interval());
    interval.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match sampler.sample_from(&source) {
                    Ok(rate) => info!(
                        kbps_sent = %format!("{:.2}", rate.sent_rate_kbps),
                        kbps_recv = %format!("{:.2}", rate.recv_rate_kbps),
                        interval_ms = ?rate.interval_ms,
                        "Network throughput"
                    ),
                    Err(e) => warn!("Network sample failed: {}", e),
                }
                match probe.performance() {
                    Ok(perf) => info!(
                        cpu_usage = %format!("{:.1}", perf.cpu_usage_percent),
                        memory_usage = %format!("{:.1}", perf.memory_usage_percent),
                        "Host performance"
                    ),
                    Err(e) => warn!("Host sample failed: {}", e),
                }
            }
            result = &mut shutdown => {
                result.context("waiting for shutdown signal")?;
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Resman Monitor stopped");
    Ok(())
}

fn chart_access_log(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let rows: Vec<AccessLogRow> = serde_json::from_str(&content)?;
    let histogram = HistogramAggregator::new()
        .aggregate_rows(rows.into_iter().map(|r| (r.category, r.timestamp)));

    for category in histogram.categories() {
        info!(
            category,
            series = ?histogram.series(category),
            "Access histogram"
        );
    }
    info!(
        total = histogram.grand_total(),
        skipped = histogram.skipped,
        "Charted access log"
    );
    Ok(())
}
