//! Extraction of the SegWit witness commitment from a coinbase transaction.

use bitcoin::TxOut;

/// OP_RETURN, a 36-byte push, and the BIP141 witness-commitment tag.
const COMMITMENT_MARKER: [u8; 6] = [0x6a, 0x24, 0xaa, 0x21, 0xa9, 0xed];

/// Fixed-width placeholder reported when the coinbase carries no witness
/// commitment. Downstream contract calls are byte-width-sensitive, so the
/// length must not change.
const NO_COMMITMENT: &str = "0000000000000000000000000000000000";

/// Witness-commitment fields lifted from a coinbase output script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessCommitment {
    /// Committed witness Merkle root, hex-encoded.
    pub witness_merkle_root: String,
    /// Reserved value, normalized to exactly 32 bytes of hex.
    pub witness_reserved_value: String,
}

impl WitnessCommitment {
    fn absent() -> Self {
        WitnessCommitment {
            witness_merkle_root: NO_COMMITMENT.to_string(),
            witness_reserved_value: NO_COMMITMENT.to_string(),
        }
    }
}

/// Scan coinbase outputs, in order, for the witness commitment.
///
/// The first output whose script starts with `6a24aa21a9ed` wins and
/// scanning stops. The committed witness Merkle root is the 32 bytes
/// immediately after the marker; the reserved value is everything after the
/// OP_RETURN opcode, right-padded or truncated to exactly 32 bytes.
///
/// Never fails: a coinbase without a commitment yields the fixed-width zero
/// placeholders.
pub fn extract_commitment(outputs: &[TxOut]) -> WitnessCommitment {
    for output in outputs {
        let script = output.script_pubkey.as_bytes();
        if script.starts_with(&COMMITMENT_MARKER) && script.len() >= 38 {
            return WitnessCommitment {
                witness_merkle_root: hex::encode(&script[6..38]),
                witness_reserved_value: ensure_32_bytes(&hex::encode(&script[1..])),
            };
        }
    }
    WitnessCommitment::absent()
}

/// Normalize a hex string to exactly 64 characters, right-padding with
/// zeros when shorter and truncating when longer.
fn ensure_32_bytes(hex_str: &str) -> String {
    let clean = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if clean.len() < 64 {
        format!("{:0<64}", clean)
    } else {
        clean[..64].to_string()
    }
}
