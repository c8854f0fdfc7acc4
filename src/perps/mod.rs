//! Jupiter Perpetuals account source: JSON-RPC fetch and `Position` decoding.

pub mod constants;
pub mod decoder;
pub mod rpc_client;

pub use decoder::{account_discriminator, CustodyMap, DecodeError, PositionDecoder};
pub use rpc_client::{FetchError, PerpsClient, ProgramAccount};

use async_trait::async_trait;

use crate::models::RawPosition;

/// Source of decoded position records for one polling cycle.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Fetch and decode every position account, open or closed.
    async fn fetch_positions(&self) -> Result<Vec<RawPosition>, FetchError>;
}
