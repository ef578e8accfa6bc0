//! Shapes RPC block records into the assembler's input.
//!
//! This is the boundary where display-order ids coming off the wire are
//! reversed into internal order; nothing past this point handles a hash
//! whose byte order is ambiguous.

use anyhow::{anyhow, Context, Result};
use bitcoin::consensus::deserialize;
use bitcoin::Transaction;
use segwit_proof::{BlockContext, DisplayHash, ProofInput};

use crate::rpc::{BitcoinRpc, RpcBlock};

/// 80 header bytes as hex.
const HEADER_HEX_LEN: usize = 160;

/// Fetch and shape everything needed to assemble a proof for `txid` in the
/// block `blockhash`.
pub async fn fetch_proof_input(
    rpc: &BitcoinRpc,
    txid: &str,
    blockhash: &str,
) -> Result<ProofInput> {
    let block = rpc.get_block(blockhash).await?;
    let block_hex = rpc.get_block_hex(blockhash).await?;
    build_proof_input(txid, &block, &block_hex)
}

/// Convenience for probing a live node: proof input for the transaction at
/// `index` of the current best block.
pub async fn fetch_recent(rpc: &BitcoinRpc, index: usize) -> Result<ProofInput> {
    let info = rpc.chain_info().await?;
    let block = rpc.get_block(&info.bestblockhash).await?;
    let txid = block
        .tx
        .get(index)
        .map(|tx| tx.txid.clone())
        .ok_or_else(|| anyhow!("best block has no transaction at index {index}"))?;
    let block_hex = rpc.get_block_hex(&info.bestblockhash).await?;
    build_proof_input(&txid, &block, &block_hex)
}

fn build_proof_input(txid: &str, block: &RpcBlock, block_hex: &str) -> Result<ProofInput> {
    if block_hex.len() < HEADER_HEX_LEN {
        return Err(anyhow!(
            "raw block for {} is shorter than an 80-byte header",
            block.hash
        ));
    }
    let header_hex = block_hex[..HEADER_HEX_LEN].to_string();

    let mut txids = Vec::with_capacity(block.tx.len());
    for tx in &block.tx {
        txids.push(DisplayHash::from_hex(&tx.txid)?.to_internal());
    }

    let entry = block
        .tx
        .iter()
        .find(|tx| tx.txid == txid)
        .ok_or_else(|| anyhow!("transaction {txid} not present in block {}", block.hash))?;
    let coinbase_entry = block
        .tx
        .first()
        .ok_or_else(|| anyhow!("block {} has no transactions", block.hash))?;

    let tx = decode_tx(&entry.hex).with_context(|| format!("target transaction {txid}"))?;
    let coinbase = decode_tx(&coinbase_entry.hex).context("coinbase transaction")?;

    Ok(ProofInput {
        txid: DisplayHash::from_hex(txid)?,
        tx,
        coinbase,
        block: BlockContext {
            height: block.height,
            header_hex,
            merkle_root: DisplayHash::from_hex(&block.merkleroot)?,
            txids,
        },
    })
}

fn decode_tx(hex_str: &str) -> Result<Transaction> {
    let bytes = hex::decode(hex_str).context("transaction hex decode")?;
    deserialize(&bytes).context("transaction deserialize")
}
