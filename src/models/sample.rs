use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Asset, Side};

/// Column names of the `open_interest` table, in sample field order.
pub const SAMPLE_COLUMNS: [&str; 6] = [
    "sol_long_interest",
    "sol_short_interest",
    "btc_long_interest",
    "btc_short_interest",
    "eth_long_interest",
    "eth_short_interest",
];

/// Open interest totals for one polling cycle, in USD truncated to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct Sample {
    pub sol_long_interest: Decimal,
    pub sol_short_interest: Decimal,
    pub btc_long_interest: Decimal,
    pub btc_short_interest: Decimal,
    pub eth_long_interest: Decimal,
    pub eth_short_interest: Decimal,
}

impl Sample {
    /// Total for one (asset, side) pair.
    pub fn interest(&self, asset: Asset, side: Side) -> Decimal {
        match (asset, side) {
            (Asset::Sol, Side::Long) => self.sol_long_interest,
            (Asset::Sol, Side::Short) => self.sol_short_interest,
            (Asset::Btc, Side::Long) => self.btc_long_interest,
            (Asset::Btc, Side::Short) => self.btc_short_interest,
            (Asset::Eth, Side::Long) => self.eth_long_interest,
            (Asset::Eth, Side::Short) => self.eth_short_interest,
        }
    }

    /// Long minus short. May be negative.
    pub fn net_exposure(&self, asset: Asset) -> Decimal {
        self.interest(asset, Side::Long) - self.interest(asset, Side::Short)
    }

    /// The six totals in column order.
    pub fn values(&self) -> [Decimal; 6] {
        [
            self.sol_long_interest,
            self.sol_short_interest,
            self.btc_long_interest,
            self.btc_short_interest,
            self.eth_long_interest,
            self.eth_short_interest,
        ]
    }
}

/// Database row for the `open_interest` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredSample {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sample: Sample,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_matches_named_fields() {
        let sample = Sample {
            sol_long_interest: Decimal::from(1),
            sol_short_interest: Decimal::from(2),
            btc_long_interest: Decimal::from(3),
            btc_short_interest: Decimal::from(4),
            eth_long_interest: Decimal::from(5),
            eth_short_interest: Decimal::from(6),
        };

        let mut from_pairs = Vec::new();
        for asset in Asset::ALL {
            for side in Side::ALL {
                from_pairs.push(sample.interest(asset, side));
            }
        }
        assert_eq!(from_pairs, sample.values().to_vec());
    }

    #[test]
    fn test_net_exposure_can_be_negative() {
        let sample = Sample {
            eth_long_interest: Decimal::from(100),
            eth_short_interest: Decimal::from(250),
            ..Default::default()
        };
        assert_eq!(sample.net_exposure(Asset::Eth), Decimal::from(-150));
        assert_eq!(sample.net_exposure(Asset::Sol), Decimal::ZERO);
    }

    #[test]
    fn test_columns_follow_asset_side_order() {
        let mut expected = Vec::new();
        for asset in Asset::ALL {
            for side in Side::ALL {
                expected.push(format!(
                    "{}_{}_interest",
                    asset.as_str().to_lowercase(),
                    side.as_str()
                ));
            }
        }
        assert_eq!(expected, SAMPLE_COLUMNS.to_vec());
    }
}
