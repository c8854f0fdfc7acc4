use serde::{Deserialize, Serialize};

use super::{Asset, Side};

/// A decoded `Position` account, reduced to the fields the tracker uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Account address (base58).
    pub address: String,
    /// Custody account the position trades against (base58).
    pub custody: String,
    /// `None` when the custody is not one of the tracked assets.
    pub asset: Option<Asset>,
    pub side: Side,
    /// Position size in USDC base units (6 decimals). Zero means closed.
    pub size_usd: u64,
}

impl RawPosition {
    /// Closed positions are never deleted on-chain, they keep `size_usd == 0`.
    pub fn is_open(&self) -> bool {
        self.size_usd > 0
    }
}
