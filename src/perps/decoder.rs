use sha2::{Digest, Sha256};
use thiserror::Error;

use super::constants::CUSTODY_PUBKEYS;
use crate::models::{Asset, RawPosition, Side};

/// Serialized size of a `Position` account, discriminator included.
pub const POSITION_ACCOUNT_LEN: usize = 210;

// Field offsets within a `Position` account (Borsh, little-endian).
// 0 discriminator, 8 owner, 40 pool, 72 custody, 104 collateral custody,
// 136 open time, 144 update time, 152 side, 153 price, 161 size usd.
const CUSTODY_OFFSET: usize = 72;
const SIDE_OFFSET: usize = 152;
const SIZE_USD_OFFSET: usize = 161;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("account data is {len} bytes, too short for a position")]
    TooShort { len: usize },

    #[error("account discriminator does not match a position")]
    DiscriminatorMismatch,

    #[error("invalid side tag {0}")]
    InvalidSide(u8),

    #[error("invalid base64 account data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid pubkey {pubkey}: {reason}")]
    InvalidPubkey { pubkey: String, reason: String },
}

/// Anchor account discriminator: first 8 bytes of `sha256("account:<Name>")`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

/// Decode a base58 pubkey into its 32 raw bytes.
pub fn decode_pubkey(pubkey: &str) -> Result<[u8; 32], DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidPubkey {
        pubkey: pubkey.to_string(),
        reason,
    };
    let bytes = bs58::decode(pubkey)
        .into_vec()
        .map_err(|e| invalid(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| invalid(format!("{} bytes, expected 32", b.len())))
}

/// Custody account to asset lookup.
#[derive(Debug, Clone)]
pub struct CustodyMap {
    entries: Vec<([u8; 32], Asset)>,
}

impl CustodyMap {
    pub fn new(custodies: &[(Asset, &str)]) -> Result<Self, DecodeError> {
        let entries = custodies
            .iter()
            .map(|(asset, pubkey)| Ok((decode_pubkey(pubkey)?, *asset)))
            .collect::<Result<Vec<_>, DecodeError>>()?;
        Ok(Self { entries })
    }

    /// The SOL, BTC and ETH custodies of Jupiter Perpetuals.
    pub fn jupiter() -> Result<Self, DecodeError> {
        Self::new(&CUSTODY_PUBKEYS)
    }

    pub fn resolve(&self, custody: &[u8; 32]) -> Option<Asset> {
        self.entries
            .iter()
            .find(|(key, _)| key == custody)
            .map(|(_, asset)| *asset)
    }
}

/// Decoder for raw `Position` account bytes.
#[derive(Debug, Clone)]
pub struct PositionDecoder {
    discriminator: [u8; 8],
    custodies: CustodyMap,
}

impl PositionDecoder {
    pub fn new(discriminator: [u8; 8], custodies: CustodyMap) -> Self {
        Self {
            discriminator,
            custodies,
        }
    }

    pub fn discriminator(&self) -> [u8; 8] {
        self.discriminator
    }

    /// Decode one account. Returns `Ok(None)` for a position with no side,
    /// which cannot be attributed to either direction. A bare "not long means
    /// short" check would count these as short instead.
    pub fn decode(&self, address: &str, data: &[u8]) -> Result<Option<RawPosition>, DecodeError> {
        if data.len() < POSITION_ACCOUNT_LEN {
            return Err(DecodeError::TooShort { len: data.len() });
        }
        if data[..8] != self.discriminator {
            return Err(DecodeError::DiscriminatorMismatch);
        }

        let mut custody = [0u8; 32];
        custody.copy_from_slice(&data[CUSTODY_OFFSET..CUSTODY_OFFSET + 32]);

        let side = match data[SIDE_OFFSET] {
            0 => return Ok(None),
            tag => Side::from_tag(tag).ok_or(DecodeError::InvalidSide(tag))?,
        };

        let mut size = [0u8; 8];
        size.copy_from_slice(&data[SIZE_USD_OFFSET..SIZE_USD_OFFSET + 8]);

        Ok(Some(RawPosition {
            address: address.to_string(),
            custody: bs58::encode(custody).into_string(),
            asset: self.custodies.resolve(&custody),
            side,
            size_usd: u64::from_le_bytes(size),
        }))
    }
}
