use metrics::{counter, gauge, histogram};
use rust_decimal::prelude::ToPrimitive;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

use crate::analytics::{aggregate, detect_alert, AlertPolicy, Detection};
use crate::db::SampleStore;
use crate::errors::CycleError;
use crate::models::{Asset, Sample, Side, StoredSample};
use crate::perps::PositionSource;
use crate::services::notifier::{format_open_interest_alert, AlertSink};

/// Result of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sample: Sample,
    pub stored: StoredSample,
    pub detection: Detection,
    /// True only when an alert was due and the sink accepted it.
    pub alert_delivered: bool,
}

/// Runs the fetch → aggregate → compare → alert → persist cycle.
pub struct Tracker<P, S, N> {
    source: P,
    store: S,
    notifier: Option<N>,
    policy: AlertPolicy,
}

impl<P, S, N> Tracker<P, S, N>
where
    P: PositionSource,
    S: SampleStore,
    N: AlertSink,
{
    pub fn new(source: P, store: S, notifier: Option<N>, policy: AlertPolicy) -> Self {
        Self {
            source,
            store,
            notifier,
            policy,
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> Option<&N> {
        self.notifier.as_ref()
    }

    /// Run one cycle. Any error aborts the cycle before the sample is stored,
    /// except a notification failure which is logged and skipped.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let positions = self.source.fetch_positions().await?;
        let open_count = positions.iter().filter(|p| p.is_open()).count();

        let sample = aggregate(&positions)?;
        tracing::info!(
            positions = positions.len(),
            open_positions = open_count,
            sol_long = %sample.sol_long_interest,
            sol_short = %sample.sol_short_interest,
            btc_long = %sample.btc_long_interest,
            btc_short = %sample.btc_short_interest,
            eth_long = %sample.eth_long_interest,
            eth_short = %sample.eth_short_interest,
            "Open interest aggregated"
        );
        record_sample_gauges(&sample);

        let previous = self
            .store
            .most_recent()
            .await
            .map_err(CycleError::StorageRead)?;

        let detection = detect_alert(&sample, previous.as_ref(), &self.policy);
        let alert_delivered = match &detection {
            Detection::NoPreviousSample => {
                tracing::info!("No previous sample stored — skipping change detection");
                false
            }
            Detection::Evaluated(decision) => {
                for delta in &decision.assets {
                    tracing::debug!(
                        asset = %delta.asset,
                        net_previous = %delta.net_previous,
                        net_current = %delta.net_current,
                        absolute_delta = %delta.absolute_delta,
                        relative_delta = %delta.relative_delta,
                        exceeded = delta.exceeded,
                        "Net exposure compared"
                    );
                }

                if decision.should_alert() {
                    for delta in decision.exceeded() {
                        counter!("oi_alerts_total", "asset" => delta.asset.as_str()).increment(1);
                    }
                    self.notify(&format_open_interest_alert(decision)).await
                } else {
                    false
                }
            }
        };

        let stored = self
            .store
            .append(&sample)
            .await
            .map_err(CycleError::StorageWrite)?;
        tracing::info!(
            id = stored.id,
            timestamp = %stored.timestamp,
            "Open interest sample stored"
        );

        Ok(CycleReport {
            sample,
            stored,
            detection,
            alert_delivered,
        })
    }

    /// Best-effort delivery; returns whether the message went out.
    async fn notify(&self, message: &str) -> bool {
        tracing::warn!(alert = %message, "Open interest alert");

        let Some(notifier) = &self.notifier else {
            tracing::warn!("Notifier not configured — alert only logged");
            return false;
        };

        match notifier.send(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send alert notification");
                false
            }
        }
    }
}

/// Run one cycle immediately, then every `period`, until `shutdown` resolves.
///
/// Cycles never overlap: a cycle that outlasts the period delays the next
/// tick instead of queueing a burst.
pub async fn run_tracker<P, S, N, F>(tracker: &Tracker<P, S, N>, period: Duration, shutdown: F)
where
    P: PositionSource,
    S: SampleStore,
    N: AlertSink,
    F: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(interval_secs = period.as_secs(), "Open interest tracker started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested — stopping open interest tracker");
                break;
            }
            _ = ticker.tick() => {}
        }

        tracing::info!("Running open interest tracker...");
        let started = Instant::now();
        counter!("oi_cycles_total").increment(1);

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested mid-cycle — stopping open interest tracker");
                break;
            }
            result = tracker.run_cycle() => {
                if let Err(e) = result {
                    counter!("oi_cycle_failures_total", "stage" => e.stage()).increment(1);
                    tracing::error!(stage = e.stage(), error = %e, "Open interest cycle failed");
                }
            }
        }

        histogram!("oi_cycle_duration_seconds").record(started.elapsed().as_secs_f64());
    }
}

fn record_sample_gauges(sample: &Sample) {
    for asset in Asset::ALL {
        for side in Side::ALL {
            let value = sample.interest(asset, side).to_f64().unwrap_or(0.0);
            gauge!("oi_open_interest_usd", "asset" => asset.as_str(), "side" => side.as_str())
                .set(value);
        }
    }
}
