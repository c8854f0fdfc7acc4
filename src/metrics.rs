use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::models::{Asset, Side};

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`
/// and register all tracker metrics. Must run inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("oi_cycles_total").absolute(0);
    for stage in ["fetch", "aggregate", "read_previous", "persist"] {
        counter!("oi_cycle_failures_total", "stage" => stage).absolute(0);
    }
    for asset in Asset::ALL {
        counter!("oi_alerts_total", "asset" => asset.as_str()).absolute(0);
        for side in Side::ALL {
            gauge!("oi_open_interest_usd", "asset" => asset.as_str(), "side" => side.as_str())
                .set(0.0);
        }
    }

    // Histogram is lazily created on first record; force creation.
    histogram!("oi_cycle_duration_seconds").record(0.0);

    Ok(())
}
