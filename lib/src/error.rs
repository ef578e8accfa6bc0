use thiserror::Error;

/// Failures surfaced while assembling a proof bundle.
///
/// Every variant is deterministic for its input: retrying without fetching
/// new data cannot succeed.
#[derive(Debug, Error)]
pub enum ProofError {
    /// The target transaction id is absent from the block's id list.
    #[error("transaction {0} not found in block")]
    TransactionNotFound(String),

    /// The recomputed Merkle root disagrees with the root declared by the
    /// block header. Either the id list is corrupted or a byte-order bug
    /// crept in upstream; a proof built from this list would fail on-chain.
    #[error("merkle root mismatch: computed {computed}, block declares {declared}")]
    MerkleRootMismatch { computed: String, declared: String },

    /// The block record carries no transactions.
    #[error("block has no transactions")]
    EmptyBlock,

    /// A hash string was not 64 hex characters.
    #[error("malformed hash {0:?}: expected 64 hex characters")]
    InvalidHash(String),
}
