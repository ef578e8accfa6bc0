//! Off-chain construction of SegWit SPV proof bundles.
//!
//! Builds the Merkle tree over a block's ordered transaction ids, derives
//! sibling authentication paths for a target transaction and for the
//! coinbase, extracts the coinbase witness commitment, and assembles the
//! [`SegwitData`] bundle that lets an on-chain verifier confirm, from the
//! block header alone, that the transaction and its witness data were mined
//! in that block.
//!
//! All operations are synchronous and pure; fetching block data belongs to
//! the service crate.

pub mod assemble;
pub mod commitment;
pub mod error;
pub mod hash;
pub mod merkle;

pub use assemble::{assemble, BlockContext, ProofInput, SegwitData};
pub use commitment::{extract_commitment, WitnessCommitment};
pub use error::ProofError;
pub use hash::{DisplayHash, InternalHash};
pub use merkle::{
    build_tree, hash_pair, merkle_proof, merkle_root, verify_proof, Direction, ProofNode,
};
