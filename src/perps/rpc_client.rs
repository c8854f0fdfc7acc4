use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use super::decoder::{DecodeError, PositionDecoder};
use super::PositionSource;
use crate::models::RawPosition;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("failed to decode account {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: DecodeError,
    },
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: UiAccount,
}

#[derive(Debug, Deserialize)]
struct UiAccount {
    /// `[payload, encoding]`
    data: (String, String),
}

/// A program-owned account with its raw data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAccount {
    pub pubkey: String,
    pub data: Vec<u8>,
}

/// Reads `Position` accounts of the perpetuals program over Solana JSON-RPC.
#[derive(Debug, Clone)]
pub struct PerpsClient {
    http: Client,
    rpc_url: String,
    program_id: String,
    decoder: PositionDecoder,
}

impl PerpsClient {
    pub fn new(
        http: Client,
        rpc_url: String,
        program_id: String,
        decoder: PositionDecoder,
    ) -> Self {
        Self {
            http,
            rpc_url,
            program_id,
            decoder,
        }
    }

    /// HTTP client sized for `getProgramAccounts`, which returns every
    /// position account in one response.
    pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(timeout).build()
    }

    /// Fetch every program account whose data starts with the position
    /// discriminator.
    pub async fn get_position_accounts(&self) -> Result<Vec<ProgramAccount>, FetchError> {
        let request = program_accounts_request(&self.program_id, self.decoder.discriminator());

        let resp: RpcResponse<Vec<KeyedAccount>> = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        into_accounts(resp)
    }
}

#[async_trait]
impl PositionSource for PerpsClient {
    async fn fetch_positions(&self) -> Result<Vec<RawPosition>, FetchError> {
        let accounts = self.get_position_accounts().await?;
        tracing::debug!(account_count = accounts.len(), "Fetched position accounts");
        decode_accounts(&self.decoder, &accounts)
    }
}

/// `getProgramAccounts` payload selecting accounts whose first bytes equal
/// `discriminator`.
pub fn program_accounts_request(program_id: &str, discriminator: [u8; 8]) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getProgramAccounts",
        "params": [program_id, {
            "commitment": "confirmed",
            "encoding": "base64",
            "filters": [{
                "memcmp": {
                    "offset": 0,
                    "bytes": BASE64.encode(discriminator),
                    "encoding": "base64"
                }
            }]
        }]
    })
}

/// Decode fetched accounts. Positions without a side are dropped; any other
/// decode failure fails the whole batch.
pub fn decode_accounts(
    decoder: &PositionDecoder,
    accounts: &[ProgramAccount],
) -> Result<Vec<RawPosition>, FetchError> {
    let mut positions = Vec::with_capacity(accounts.len());
    let mut sideless = 0usize;

    for account in accounts {
        match decoder.decode(&account.pubkey, &account.data) {
            Ok(Some(position)) => positions.push(position),
            Ok(None) => sideless += 1,
            Err(source) => {
                return Err(FetchError::Decode {
                    address: account.pubkey.clone(),
                    source,
                })
            }
        }
    }

    if sideless > 0 {
        tracing::debug!(sideless, "Skipped position accounts without a side");
    }

    Ok(positions)
}

fn into_accounts(resp: RpcResponse<Vec<KeyedAccount>>) -> Result<Vec<ProgramAccount>, FetchError> {
    if let Some(err) = resp.error {
        return Err(FetchError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    let accounts = resp
        .result
        .ok_or_else(|| FetchError::Unexpected("response has neither result nor error".into()))?;

    accounts
        .into_iter()
        .map(|keyed| {
            let (payload, encoding) = keyed.account.data;
            if encoding != "base64" {
                return Err(FetchError::Unexpected(format!(
                    "account {} returned with encoding {encoding}",
                    keyed.pubkey
                )));
            }
            let data = BASE64.decode(payload).map_err(|e| FetchError::Decode {
                address: keyed.pubkey.clone(),
                source: DecodeError::Base64(e),
            })?;
            Ok(ProgramAccount {
                pubkey: keyed.pubkey,
                data,
            })
        })
        .collect()
}
