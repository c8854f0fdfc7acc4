use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use super::format::{format_fixed_point, DISPLAY_DECIMALS};
use crate::models::{Asset, RawPosition, Sample, Side};
use crate::perps::constants::USDC_DECIMALS;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{asset} {side} total {formatted} does not fit in a decimal")]
    OutOfRange {
        asset: Asset,
        side: Side,
        formatted: String,
    },
}

/// Raw per-(asset, side) sums in USDC base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawTotals {
    totals: [[u128; 2]; 3],
}

impl RawTotals {
    pub fn get(&self, asset: Asset, side: Side) -> u128 {
        self.totals[asset_index(asset)][side_index(side)]
    }

    fn add(&mut self, asset: Asset, side: Side, size: u64) {
        let slot = &mut self.totals[asset_index(asset)][side_index(side)];
        *slot = slot.saturating_add(size as u128);
    }
}

/// Sum open position sizes by asset and side.
///
/// Positions with zero size are closed and skipped; positions whose custody
/// is not a tracked asset are skipped as well.
pub fn sum_open_interest(positions: &[RawPosition]) -> RawTotals {
    let mut totals = RawTotals::default();
    for position in positions.iter().filter(|p| p.is_open()) {
        if let Some(asset) = position.asset {
            totals.add(asset, position.side, position.size_usd);
        }
    }
    totals
}

/// Build a sample from a set of positions.
///
/// Each total goes through the display formatter and is parsed back, so the
/// stored value is truncated to cents exactly as previous rows were.
pub fn aggregate(positions: &[RawPosition]) -> Result<Sample, AggregateError> {
    let totals = sum_open_interest(positions);
    let usd = |asset, side| to_display_decimal(totals.get(asset, side), asset, side);

    Ok(Sample {
        sol_long_interest: usd(Asset::Sol, Side::Long)?,
        sol_short_interest: usd(Asset::Sol, Side::Short)?,
        btc_long_interest: usd(Asset::Btc, Side::Long)?,
        btc_short_interest: usd(Asset::Btc, Side::Short)?,
        eth_long_interest: usd(Asset::Eth, Side::Long)?,
        eth_short_interest: usd(Asset::Eth, Side::Short)?,
    })
}

fn to_display_decimal(total: u128, asset: Asset, side: Side) -> Result<Decimal, AggregateError> {
    let formatted = format_fixed_point(total, USDC_DECIMALS, DISPLAY_DECIMALS);
    Decimal::from_str(&formatted).map_err(|_| AggregateError::OutOfRange {
        asset,
        side,
        formatted,
    })
}

fn asset_index(asset: Asset) -> usize {
    match asset {
        Asset::Sol => 0,
        Asset::Btc => 1,
        Asset::Eth => 2,
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Long => 0,
        Side::Short => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(asset: Option<Asset>, side: Side, size_usd: u64) -> RawPosition {
        RawPosition {
            address: "position".into(),
            custody: "custody".into(),
            asset,
            side,
            size_usd,
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let sample = aggregate(&[]).unwrap();
        assert_eq!(sample, Sample::default());
        assert!(sample.values().iter().all(|v| v.is_zero()));
    }

    #[test]
    fn test_closed_positions_are_excluded() {
        let positions = vec![
            position(Some(Asset::Sol), Side::Long, 0),
            position(Some(Asset::Btc), Side::Short, 0),
            position(Some(Asset::Eth), Side::Long, 0),
        ];
        assert_eq!(aggregate(&positions).unwrap(), Sample::default());
    }

    #[test]
    fn test_sums_by_asset_and_side() {
        let positions = vec![
            position(Some(Asset::Sol), Side::Long, 1_500_000),
            position(Some(Asset::Sol), Side::Long, 2_250_000),
            position(Some(Asset::Sol), Side::Short, 10_000_000),
            position(Some(Asset::Btc), Side::Long, 123_456_789),
            position(Some(Asset::Eth), Side::Short, 5_000_000),
            position(Some(Asset::Eth), Side::Short, 0),
        ];
        let sample = aggregate(&positions).unwrap();

        assert_eq!(sample.sol_long_interest, Decimal::new(375, 2));
        assert_eq!(sample.sol_short_interest, Decimal::from(10));
        assert_eq!(sample.btc_long_interest, Decimal::new(12345, 2));
        assert_eq!(sample.btc_short_interest, Decimal::ZERO);
        assert_eq!(sample.eth_long_interest, Decimal::ZERO);
        assert_eq!(sample.eth_short_interest, Decimal::from(5));
    }

    #[test]
    fn test_untracked_custody_is_ignored() {
        let positions = vec![
            position(None, Side::Long, 99_000_000),
            position(Some(Asset::Btc), Side::Short, 1_000_000),
        ];
        let sample = aggregate(&positions).unwrap();
        assert_eq!(sample.btc_short_interest, Decimal::ONE);
        assert_eq!(
            sample.values().iter().copied().sum::<Decimal>(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_total_is_truncated_after_summing() {
        // 0.009999 + 0.009999 = 0.019998, truncated to 0.01
        let positions = vec![
            position(Some(Asset::Sol), Side::Long, 9_999),
            position(Some(Asset::Sol), Side::Long, 9_999),
        ];
        let sample = aggregate(&positions).unwrap();
        assert_eq!(sample.sol_long_interest, Decimal::new(1, 2));
    }

    #[test]
    fn test_large_sums_do_not_overflow_u64() {
        let positions = vec![
            position(Some(Asset::Btc), Side::Long, u64::MAX),
            position(Some(Asset::Btc), Side::Long, u64::MAX),
        ];
        let totals = sum_open_interest(&positions);
        assert_eq!(totals.get(Asset::Btc, Side::Long), 2 * u64::MAX as u128);

        let sample = aggregate(&positions).unwrap();
        assert_eq!(
            sample.btc_long_interest,
            Decimal::from_str("36893488147419.10").unwrap()
        );
    }

    #[test]
    fn test_order_independent() {
        let mut positions = vec![
            position(Some(Asset::Sol), Side::Long, 1_234_567),
            position(Some(Asset::Eth), Side::Short, 7_654_321),
            position(Some(Asset::Sol), Side::Long, 3_333_333),
            position(Some(Asset::Btc), Side::Short, 42),
            position(None, Side::Short, 1_000_000),
        ];
        let forward = aggregate(&positions).unwrap();
        positions.reverse();
        let reversed = aggregate(&positions).unwrap();
        positions.rotate_left(2);
        let rotated = aggregate(&positions).unwrap();

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }
}
