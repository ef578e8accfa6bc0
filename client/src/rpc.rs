//! Minimal Bitcoin Core JSON-RPC client.
//!
//! Only the three calls the proof pipeline needs: `getblock` at verbosity 2
//! for structured transactions, `getblock` at verbosity 0 for the raw block
//! (whose first 160 hex characters are the header), and
//! `getblockchaininfo` for tip discovery.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct BitcoinRpc {
    client: reqwest::Client,
    url: String,
    user: String,
    pass: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<Value>,
}

/// One transaction entry from `getblock` verbosity 2.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcTx {
    /// Display-order transaction id.
    pub txid: String,
    /// Raw witness serialization.
    pub hex: String,
}

/// `getblock` verbosity 2 response, trimmed to what the assembler needs.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcBlock {
    pub hash: String,
    pub height: u64,
    pub merkleroot: String,
    pub tx: Vec<RpcTx>,
}

/// `getblockchaininfo`, trimmed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainInfo {
    pub bestblockhash: String,
}

impl BitcoinRpc {
    pub fn new(url: &str, user: &str, pass: &str) -> Self {
        BitcoinRpc {
            client: reqwest::Client::new(),
            url: url.to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
        }
    }

    /// Issue a JSON-RPC 1.0 call and unwrap its result envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": "segwit-proof",
            "method": method,
            "params": params,
        });
        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.pass))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("rpc transport failure for {method}"))?
            .json()
            .await
            .with_context(|| format!("rpc response decode failure for {method}"))?;
        if let Some(err) = response.error {
            return Err(anyhow!("rpc error for {method}: {err}"));
        }
        response
            .result
            .ok_or_else(|| anyhow!("rpc returned no result for {method}"))
    }

    pub async fn get_block(&self, blockhash: &str) -> Result<RpcBlock> {
        self.call("getblock", json!([blockhash, 2])).await
    }

    /// Raw block hex; the first 160 characters are the 80-byte header.
    pub async fn get_block_hex(&self, blockhash: &str) -> Result<String> {
        self.call("getblock", json!([blockhash, 0])).await
    }

    pub async fn chain_info(&self) -> Result<ChainInfo> {
        self.call("getblockchaininfo", json!([])).await
    }
}
