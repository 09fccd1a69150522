use crate::digest::Digest;
use crate::error::{Result, SealError};

/// What happens to the trailing digest of a level with an odd number of nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OddLeafPolicy {
    /// Carry the unmatched digest to the next level unchanged.
    Promote,
    /// Pair the unmatched digest with itself and hash the pair.
    Duplicate,
}

/// Policy used for every manifest root. Changing it changes the root of
/// every odd-sized file set, so manifests sealed under one value do not
/// verify under the other.
pub const ODD_LEAF_POLICY: OddLeafPolicy = OddLeafPolicy::Promote;

/// Binary Merkle tree over already-hashed leaves. Siblings are ordered by
/// byte value before hashing, so a parent does not depend on the internal
/// order of its pair; the root still depends on the order of the leaves.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    pub fn build(leaves: &[Digest]) -> Result<Self> {
        Self::build_with(leaves, ODD_LEAF_POLICY)
    }

    pub fn build_with(leaves: &[Digest], policy: OddLeafPolicy) -> Result<Self> {
        if leaves.is_empty() {
            return Err(SealError::EmptyInput);
        }
        let mut levels = vec![leaves.to_vec()];
        while let Some(layer) = levels.last().filter(|l| l.len() > 1) {
            let mut next = Vec::with_capacity(layer.len().div_ceil(2));
            for pair in layer.chunks(2) {
                match (pair, policy) {
                    ([a, b], _) => next.push(Digest::combine(a, b)),
                    ([a], OddLeafPolicy::Promote) => next.push(*a),
                    ([a], OddLeafPolicy::Duplicate) => next.push(Digest::combine(a, a)),
                    _ => unreachable!("chunks(2) yields one or two items"),
                }
            }
            levels.push(next);
        }
        Ok(MerkleTree { levels })
    }

    pub fn root(&self) -> Digest {
        // `build_with` never produces an empty top level.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Levels from the leaves (index 0) up to the root.
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Number of hashing rounds between the leaves and the root.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

/// Compute the Merkle root of `leaves` under [`ODD_LEAF_POLICY`].
pub fn build_root(leaves: &[Digest]) -> Result<Digest> {
    let tree = MerkleTree::build(leaves)?;
    tracing::debug!(leaves = tree.leaf_count(), depth = tree.depth(), root = %tree.root(), "built merkle tree");
    Ok(tree.root())
}
