//! Merkle tree construction and inclusion-proof derivation.
//!
//! Everything here operates exclusively on internal-order hashes; byte-order
//! conversion happens at the system boundary (see [`crate::hash`]). Levels
//! with an odd count are padded by duplicating their last element before
//! pairing, matching Bitcoin's transaction Merkle tree.

use crate::hash::{sha256d, InternalHash};

/// Which side a sibling contributes on when combined with the node at the
/// current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// One step of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofNode {
    pub hash: InternalHash,
    pub direction: Direction,
}

/// Combine two child hashes into their parent: double SHA-256 over the
/// concatenated internal-order bytes, no reversal.
pub fn hash_pair(a: &InternalHash, b: &InternalHash) -> InternalHash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(a.as_bytes());
    buf[32..].copy_from_slice(b.as_bytes());
    InternalHash::from_bytes(sha256d(&buf))
}

/// Duplicate the last element when the level has an odd count, so every
/// node can be paired.
fn ensure_even(level: &mut Vec<InternalHash>) {
    if level.len() % 2 != 0 {
        let last = level[level.len() - 1];
        level.push(last);
    }
}

/// Build the full level-by-level Merkle tree over `leaves`.
///
/// Level 0 is the leaf list, each subsequent level holds the pairwise
/// combinations of the previous one, and the final level holds exactly the
/// root. An empty leaf list yields an empty tree ("no tree", not an error).
///
/// Every level with an odd count is padded before pairing, level 0
/// included; the tree stores the padded levels, so leaf-index lookups must
/// go through `tree[0]` rather than the caller's original list.
pub fn build_tree(leaves: &[InternalHash]) -> Vec<Vec<InternalHash>> {
    if leaves.is_empty() {
        return Vec::new();
    }
    let mut tree = Vec::new();
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        ensure_even(&mut level);
        let next = level
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
        tree.push(level);
        level = next;
    }
    tree.push(level);
    tree
}

/// Reduce `leaves` to the single root hash, discarding intermediate levels.
///
/// Returns `None` for an empty leaf list; callers must treat that as "no
/// proof possible", not as a valid root. For any non-empty input the result
/// is byte-identical to the top level of [`build_tree`].
pub fn merkle_root(leaves: &[InternalHash]) -> Option<InternalHash> {
    if leaves.is_empty() {
        return None;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        ensure_even(&mut level);
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    Some(level[0])
}

/// Derive the authentication path for `target` within `leaves`.
///
/// The first node is the target leaf itself with its own direction (left
/// when its leaf index is even, right when odd); one sibling node follows
/// per tree level, leaves upward, the root excluded. Consumers that want
/// only the ancestor siblings must drop the first element explicitly — the
/// deployed verifier contract expects sibling-only arrays.
///
/// Returns `None` when `leaves` is empty or `target` is not among them.
pub fn merkle_proof(target: &InternalHash, leaves: &[InternalHash]) -> Option<Vec<ProofNode>> {
    let tree = build_tree(leaves);
    let base = tree.first()?;
    let mut index = base.iter().position(|hash| hash == target)?;
    let direction = if index % 2 == 0 {
        Direction::Left
    } else {
        Direction::Right
    };
    let mut proof = vec![ProofNode {
        hash: *target,
        direction,
    }];
    for level in &tree[..tree.len() - 1] {
        let current = if index % 2 == 0 {
            Direction::Left
        } else {
            Direction::Right
        };
        let sibling_index = match current {
            Direction::Left => index + 1,
            Direction::Right => index - 1,
        };
        proof.push(ProofNode {
            hash: level[sibling_index],
            direction: current.opposite(),
        });
        index /= 2;
    }
    Some(proof)
}

/// Fold a leaf with its sibling path to recompute the root.
///
/// `siblings` is the path with the leading self-node already stripped, as
/// carried in the assembled bundle.
pub fn verify_proof(leaf: &InternalHash, siblings: &[ProofNode], root: &InternalHash) -> bool {
    let mut acc = *leaf;
    for node in siblings {
        acc = match node.direction {
            Direction::Left => hash_pair(&node.hash, &acc),
            Direction::Right => hash_pair(&acc, &node.hash),
        };
    }
    acc == *root
}
