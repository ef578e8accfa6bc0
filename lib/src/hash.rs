//! Byte-order-distinct 32-byte hashes.
//!
//! Bitcoin shows hashes reversed (display order) relative to the byte order
//! used inside protocol structures (internal order). Mixing the two is the
//! classic way to produce a proof that fails on-chain, so each order gets
//! its own type and crossing over always goes through an explicit reversal.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::ProofError;

/// Double SHA-256
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// A hash in internal byte order, as used in Merkle-tree leaves and
/// on-chain buffers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternalHash([u8; 32]);

/// A hash in display byte order, as shown by explorers and used for a
/// transaction's canonical id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHash([u8; 32]);

fn parse32(s: &str) -> Result<[u8; 32], ProofError> {
    let bytes = hex::decode(s).map_err(|_| ProofError::InvalidHash(s.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ProofError::InvalidHash(s.to_string()))
}

fn reversed(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes.reverse();
    bytes
}

impl InternalHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        InternalHash(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ProofError> {
        parse32(s).map(InternalHash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_display(self) -> DisplayHash {
        DisplayHash(reversed(self.0))
    }
}

impl DisplayHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        DisplayHash(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ProofError> {
        parse32(s).map(DisplayHash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_internal(self) -> InternalHash {
        InternalHash(reversed(self.0))
    }
}

impl fmt::Display for InternalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for InternalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternalHash({})", self.to_hex())
    }
}

impl fmt::Display for DisplayHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for DisplayHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayHash({})", self.to_hex())
    }
}
