//! Jupiter Perpetuals addresses and on-chain precision.

use crate::models::Asset;

/// Jupiter Perpetuals program on Solana mainnet.
pub const JUPITER_PERPETUALS_PROGRAM_ID: &str = "PERPHjGBqRHArX4DySjwM6UJHiR3sWAatqfdBS2qQJu";

/// Custody accounts of the tracked assets.
pub const CUSTODY_PUBKEYS: [(Asset, &str); 3] = [
    (Asset::Sol, "7xS2gz2bTp3fwCC7knJvUWTEU9Tycczu6VhJYKgi1wdz"),
    (Asset::Btc, "5Pv3gM9JrFFH883SWAhvJC9RPYmo8UNxuFtv5bMMALkm"),
    (Asset::Eth, "AQCGyheWPLeo6Qp9WpYS9m3Qj479t7R636N9ey1rEjEn"),
];

/// `sizeUsd` and other USD amounts are USDC base units.
pub const USDC_DECIMALS: u32 = 6;

/// Anchor account name of a position.
pub const POSITION_ACCOUNT: &str = "Position";
