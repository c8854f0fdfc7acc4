use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Asset, Sample, StoredSample};

/// Both gates must be exceeded for an asset to alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Fractional change of net exposure, e.g. `0.10` for 10%.
    pub relative_threshold: Decimal,
    /// Change of net exposure in USD.
    pub absolute_threshold: Decimal,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            relative_threshold: Decimal::new(10, 2),
            absolute_threshold: Decimal::from(10_000_000),
        }
    }
}

/// Relative change of net exposure between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeDelta {
    Finite(Decimal),
    /// Previous net was zero and current is not.
    Unbounded,
}

impl RelativeDelta {
    pub fn exceeds(&self, threshold: Decimal) -> bool {
        match self {
            RelativeDelta::Finite(value) => *value > threshold,
            RelativeDelta::Unbounded => true,
        }
    }
}

impl fmt::Display for RelativeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeDelta::Finite(value) => {
                write!(f, "{}%", (value * Decimal::ONE_HUNDRED).round_dp(2))
            }
            RelativeDelta::Unbounded => f.write_str("n/a"),
        }
    }
}

/// Net exposure change of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDelta {
    pub asset: Asset,
    pub net_previous: Decimal,
    pub net_current: Decimal,
    pub absolute_delta: Decimal,
    pub relative_delta: RelativeDelta,
    pub exceeded: bool,
}

/// Per-asset evaluation, in `Asset::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub assets: [AssetDelta; 3],
}

impl AlertDecision {
    pub fn should_alert(&self) -> bool {
        self.assets.iter().any(|d| d.exceeded)
    }

    pub fn exceeded(&self) -> impl Iterator<Item = &AssetDelta> {
        self.assets.iter().filter(|d| d.exceeded)
    }

    pub fn for_asset(&self, asset: Asset) -> &AssetDelta {
        match asset {
            Asset::Sol => &self.assets[0],
            Asset::Btc => &self.assets[1],
            Asset::Eth => &self.assets[2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection {
    /// Nothing stored yet; first run or after data loss.
    NoPreviousSample,
    Evaluated(AlertDecision),
}

impl Detection {
    pub fn should_alert(&self) -> bool {
        match self {
            Detection::NoPreviousSample => false,
            Detection::Evaluated(decision) => decision.should_alert(),
        }
    }
}

/// Compare a fresh sample against the latest stored one.
pub fn detect_alert(
    current: &Sample,
    previous: Option<&StoredSample>,
    policy: &AlertPolicy,
) -> Detection {
    let Some(previous) = previous else {
        return Detection::NoPreviousSample;
    };

    let assets = Asset::ALL.map(|asset| {
        asset_delta(
            asset,
            current.net_exposure(asset),
            previous.sample.net_exposure(asset),
            policy,
        )
    });

    Detection::Evaluated(AlertDecision { assets })
}

fn asset_delta(
    asset: Asset,
    net_current: Decimal,
    net_previous: Decimal,
    policy: &AlertPolicy,
) -> AssetDelta {
    let absolute_delta = (net_current - net_previous).abs();
    let relative_delta = if net_previous.is_zero() {
        if net_current.is_zero() {
            RelativeDelta::Finite(Decimal::ZERO)
        } else {
            RelativeDelta::Unbounded
        }
    } else {
        RelativeDelta::Finite(absolute_delta / net_previous.abs())
    };

    let exceeded = relative_delta.exceeds(policy.relative_threshold)
        && absolute_delta > policy.absolute_threshold;

    AssetDelta {
        asset,
        net_previous,
        net_current,
        absolute_delta,
        relative_delta,
        exceeded,
    }
}
