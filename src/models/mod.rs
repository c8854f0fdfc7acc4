pub mod position;
pub mod sample;

pub use position::RawPosition;
pub use sample::{Sample, StoredSample};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// Assets whose open interest is tracked. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Sol,
    Btc,
    Eth,
}

impl Asset {
    /// Fixed iteration order, matching the column order of a sample.
    pub const ALL: [Asset; 3] = [Asset::Sol, Asset::Btc, Asset::Eth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Sol => "SOL",
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Long, Side::Short];

    /// Map the on-chain enum tag. `0` is `Side::None` in the program and has
    /// no direction, so it maps to `None` here as well.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Side::Long),
            2 => Some(Side::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
