//! Assembly of the proof bundle from a fetched block + transaction record.

use bitcoin::consensus::serialize;
use bitcoin::Transaction;
use serde::{Deserialize, Serialize};

use crate::commitment::extract_commitment;
use crate::error::ProofError;
use crate::hash::{DisplayHash, InternalHash};
use crate::merkle::{merkle_proof, merkle_root};

/// Block-level fields supplied by the data-fetch collaborator.
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub height: u64,
    /// Raw 80-byte block header, hex-encoded.
    pub header_hex: String,
    /// Merkle root as declared by the header, display order.
    pub merkle_root: DisplayHash,
    /// Transaction ids in block order, internal byte order; index 0 is the
    /// coinbase.
    pub txids: Vec<InternalHash>,
}

/// A fetched transaction + block record, the assembler's input.
///
/// Constructed fresh per proof request; the assembler only reads it, so
/// concurrent assemblies over different records need no coordination.
#[derive(Debug, Clone)]
pub struct ProofInput {
    /// Target transaction id, display order.
    pub txid: DisplayHash,
    /// Parsed target transaction.
    pub tx: Transaction,
    /// Parsed coinbase transaction.
    pub coinbase: Transaction,
    pub block: BlockContext,
}

/// The assembled proof bundle handed to the on-chain verifier caller.
///
/// `wproof` and `cproof` are sibling-only authentication paths: the leading
/// self-node is already stripped, as the deployed verifier expects. Both are
/// reported at the shared `tree_depth` (the greater of the two lengths)
/// without further padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegwitData {
    /// Target verifier contract identifier.
    pub contract: String,
    /// Target transaction id, display order.
    pub tx_id: String,
    /// Target transaction id, internal order.
    pub tx_id_reversed: String,
    /// Coinbase transaction id, internal order.
    pub tx_id0_reversed: String,
    pub height: u64,
    /// Legacy (witness-stripped) serialization of the target transaction.
    pub tx_hex: String,
    /// Witness serialization of the target transaction.
    pub wtx_hex: String,
    /// Raw block header, hex-encoded.
    pub header: String,
    /// Leaf index of the target transaction.
    pub tx_index: usize,
    /// Authentication-path depth shared by both proofs.
    pub tree_depth: usize,
    /// Sibling hashes proving the target transaction id.
    pub wproof: Vec<String>,
    /// Sibling hashes proving the coinbase transaction id.
    pub cproof: Vec<String>,
    /// Recomputed Merkle root, internal order.
    pub merkle_root: String,
    pub witness_reserved_value: String,
    pub witness_merkle_root: String,
    /// Legacy serialization of the coinbase transaction.
    pub ctx_hex: String,
    /// Witness serialization of the coinbase transaction.
    pub wctx_hex: String,
}

/// Hex of the legacy serialization: witnesses cleared, so the consensus
/// encoder omits the marker and flag bytes.
fn legacy_hex(tx: &Transaction) -> String {
    let mut stripped = tx.clone();
    for input in &mut stripped.input {
        input.witness = bitcoin::Witness::new();
    }
    hex::encode(serialize(&stripped))
}

/// Hex of the full witness serialization.
fn witness_hex(tx: &Transaction) -> String {
    hex::encode(serialize(tx))
}

/// Sibling-only authentication path for `target`, hex-encoded.
fn sibling_hashes(
    target: &InternalHash,
    leaves: &[InternalHash],
) -> Result<Vec<String>, ProofError> {
    let proof = merkle_proof(target, leaves)
        .ok_or_else(|| ProofError::TransactionNotFound(target.to_display().to_hex()))?;
    Ok(proof
        .into_iter()
        .skip(1)
        .map(|node| node.hash.to_hex())
        .collect())
}

/// Assemble the complete [`SegwitData`] bundle for `input`.
///
/// The id list is cross-checked against the header's declared Merkle root
/// before any proof derived from it is returned. Any failure aborts the
/// whole assembly; a partial bundle is never produced.
pub fn assemble(input: &ProofInput, contract: &str) -> Result<SegwitData, ProofError> {
    let txids = &input.block.txids;
    if txids.is_empty() {
        return Err(ProofError::EmptyBlock);
    }

    let target = input.txid.to_internal();
    let tx_index = txids
        .iter()
        .position(|id| *id == target)
        .ok_or_else(|| ProofError::TransactionNotFound(input.txid.to_hex()))?;

    let computed = merkle_root(txids).ok_or(ProofError::EmptyBlock)?;
    let declared = input.block.merkle_root.to_internal();
    if computed != declared {
        return Err(ProofError::MerkleRootMismatch {
            computed: computed.to_hex(),
            declared: declared.to_hex(),
        });
    }

    // The coinbase path proves the commitment-bearing transaction sits in
    // the same tree as the target.
    let wproof = sibling_hashes(&target, txids)?;
    let cproof = sibling_hashes(&txids[0], txids)?;
    let tree_depth = wproof.len().max(cproof.len());

    let commitment = extract_commitment(&input.coinbase.output);

    Ok(SegwitData {
        contract: contract.to_string(),
        tx_id: input.txid.to_hex(),
        tx_id_reversed: target.to_hex(),
        tx_id0_reversed: txids[0].to_hex(),
        height: input.block.height,
        tx_hex: legacy_hex(&input.tx),
        wtx_hex: witness_hex(&input.tx),
        header: input.block.header_hex.clone(),
        tx_index,
        tree_depth,
        wproof,
        cproof,
        merkle_root: computed.to_hex(),
        witness_reserved_value: commitment.witness_reserved_value,
        witness_merkle_root: commitment.witness_merkle_root,
        ctx_hex: legacy_hex(&input.coinbase),
        wctx_hex: witness_hex(&input.coinbase),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness};

    fn leaf(byte: u8) -> InternalHash {
        InternalHash::from_bytes([byte; 32])
    }

    fn coinbase_tx(commitment_root: Option<[u8; 32]>) -> Transaction {
        let mut witness = Witness::new();
        witness.push([0u8; 32]);
        let mut outputs = vec![TxOut {
            value: Amount::from_sat(625_000_000),
            script_pubkey: ScriptBuf::from_bytes(vec![0x00, 0x14, 0xab, 0xcd]),
        }];
        if let Some(root) = commitment_root {
            let mut script = vec![0x6a, 0x24, 0xaa, 0x21, 0xa9, 0xed];
            script.extend_from_slice(&root);
            outputs.push(TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::from_bytes(script),
            });
        }
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from_bytes(vec![0x51]),
                sequence: Sequence::MAX,
                witness,
            }],
            output: outputs,
        }
    }

    fn target_tx() -> Transaction {
        let mut witness = Witness::new();
        witness.push([0x01, 0x02]);
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness,
            }],
            output: vec![TxOut {
                value: Amount::from_sat(1_000),
                script_pubkey: ScriptBuf::from_bytes(vec![0x00, 0x14, 0x12, 0x34]),
            }],
        }
    }

    fn input_for(txids: Vec<InternalHash>, target_index: usize) -> ProofInput {
        let declared = merkle_root(&txids).unwrap().to_display();
        ProofInput {
            txid: txids[target_index].to_display(),
            tx: target_tx(),
            coinbase: coinbase_tx(Some([0x42; 32])),
            block: BlockContext {
                height: 363_348,
                header_hex: "00".repeat(80),
                merkle_root: declared,
                txids,
            },
        }
    }

    #[test]
    fn test_assemble_bundle_fields() {
        let txids = vec![leaf(0x01), leaf(0x02), leaf(0x03)];
        let input = input_for(txids.clone(), 1);
        let data = assemble(&input, "verifier.contract").unwrap();

        assert_eq!(data.contract, "verifier.contract");
        assert_eq!(data.tx_index, 1);
        assert_eq!(data.height, 363_348);
        assert_eq!(data.tx_id, txids[1].to_display().to_hex());
        assert_eq!(data.tx_id_reversed, txids[1].to_hex());
        assert_eq!(data.tx_id0_reversed, txids[0].to_hex());

        // Three leaves pad to four: two siblings each, shared depth two,
        // self-nodes stripped
        assert_eq!(data.wproof.len(), 2);
        assert_eq!(data.cproof.len(), 2);
        assert_eq!(data.tree_depth, 2);
        assert_eq!(data.wproof[0], txids[0].to_hex());
        assert_eq!(data.cproof[0], txids[1].to_hex());

        assert_eq!(data.merkle_root, merkle_root(&txids).unwrap().to_hex());
        assert_eq!(data.witness_merkle_root, hex::encode([0x42u8; 32]));
        assert_eq!(data.witness_reserved_value.len(), 64);

        // Witness serializations carry the marker/flag bytes, legacy do not
        assert!(data.wtx_hex.starts_with("02000000000101"));
        assert!(data.tx_hex.starts_with("0200000001"));
        assert_ne!(data.wctx_hex, data.ctx_hex);
        assert!(data.wtx_hex.len() > data.tx_hex.len());
    }

    #[test]
    fn test_assemble_rejects_unknown_transaction() {
        let txids = vec![leaf(0x01), leaf(0x02)];
        let mut input = input_for(txids, 1);
        input.txid = leaf(0x7f).to_display();

        match assemble(&input, "verifier.contract") {
            Err(ProofError::TransactionNotFound(id)) => {
                assert_eq!(id, leaf(0x7f).to_display().to_hex());
            }
            other => panic!("expected TransactionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_rejects_root_mismatch() {
        let txids = vec![leaf(0x01), leaf(0x02), leaf(0x03)];
        let mut input = input_for(txids, 2);
        input.block.merkle_root = leaf(0xee).to_display();

        match assemble(&input, "verifier.contract") {
            Err(ProofError::MerkleRootMismatch { computed, declared }) => {
                assert_eq!(computed, merkle_root(&input.block.txids).unwrap().to_hex());
                assert_eq!(declared, leaf(0xee).to_hex());
            }
            other => panic!("expected MerkleRootMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_rejects_empty_block() {
        let mut input = input_for(vec![leaf(0x01)], 0);
        input.block.txids.clear();
        assert!(matches!(
            assemble(&input, "verifier.contract"),
            Err(ProofError::EmptyBlock)
        ));
    }

    #[test]
    fn test_single_transaction_block() {
        // Coinbase-only block: the target is the coinbase, both proofs are
        // empty and the root equals the lone id
        let txids = vec![leaf(0x09)];
        let input = input_for(txids.clone(), 0);
        let data = assemble(&input, "verifier.contract").unwrap();
        assert_eq!(data.tx_index, 0);
        assert_eq!(data.tree_depth, 0);
        assert!(data.wproof.is_empty());
        assert!(data.cproof.is_empty());
        assert_eq!(data.merkle_root, txids[0].to_hex());
    }

    #[test]
    fn test_missing_commitment_uses_placeholders() {
        let txids = vec![leaf(0x01), leaf(0x02)];
        let mut input = input_for(txids, 0);
        input.coinbase = coinbase_tx(None);
        let data = assemble(&input, "verifier.contract").unwrap();
        assert_eq!(data.witness_merkle_root, "0".repeat(34));
        assert_eq!(data.witness_reserved_value, "0".repeat(34));
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let input = input_for(vec![leaf(0x01), leaf(0x02)], 1);
        let data = assemble(&input, "verifier.contract").unwrap();
        let value = serde_json::to_value(&data).unwrap();
        for key in [
            "txId",
            "txIdReversed",
            "txId0Reversed",
            "txHex",
            "wtxHex",
            "txIndex",
            "treeDepth",
            "merkleRoot",
            "witnessReservedValue",
            "witnessMerkleRoot",
            "ctxHex",
            "wctxHex",
        ] {
            assert!(value.get(key).is_some(), "missing wire field {}", key);
        }

        let round_trip: SegwitData = serde_json::from_value(value).unwrap();
        assert_eq!(round_trip, data);
    }
}
