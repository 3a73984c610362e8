use crate::{Error, Hash256, double_sha256};

fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[32..].copy_from_slice(right);
    double_sha256(&data)
}

fn next_level(level: &[Hash256]) -> Vec<Hash256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [single] => hash_pair(single, single),
            _ => unreachable!("chunks(2) yields one or two elements; qed"),
        })
        .collect()
}

/// Computes the Merkle root of the ordered leaf hashes.
///
/// An odd level duplicates its last element. A single leaf is its own root.
pub fn compute_merkle_root(leaves: &[Hash256]) -> Result<Hash256, Error> {
    if leaves.is_empty() {
        return Err(Error::EmptyMerkleTree);
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }

    Ok(level[0])
}

/// Builds the sibling path from the leaf at `index` up to the root.
pub fn merkle_proof(leaves: &[Hash256], index: usize) -> Result<Vec<Hash256>, Error> {
    if index >= leaves.len() {
        return Err(Error::LeafIndexOutOfRange {
            index,
            len: leaves.len(),
        });
    }

    let mut siblings = Vec::new();
    let mut level = leaves.to_vec();
    let mut position = index;

    while level.len() > 1 {
        let sibling = position ^ 1;
        siblings.push(*level.get(sibling).unwrap_or(&level[position]));
        level = next_level(&level);
        position >>= 1;
    }

    Ok(siblings)
}

/// Folds a sibling path into a root.
///
/// Bit `i` of `index` tells whether the running hash is the right (1) or left (0) operand
/// at depth `i`.
pub fn compute_branch_root(leaf: &Hash256, siblings: &[Hash256], mut index: u32) -> Hash256 {
    let mut hash = *leaf;
    for sibling in siblings {
        hash = if index & 1 == 1 {
            hash_pair(sibling, &hash)
        } else {
            hash_pair(&hash, sibling)
        };
        index >>= 1;
    }
    hash
}

/// Checks that `leaf` sits at `index` in the tree committed to by `root`.
///
/// Any mismatch, including an index that does not fit in the path length, yields `false`.
pub fn verify_merkle_proof(leaf: &Hash256, siblings: &[Hash256], index: u32, root: &Hash256) -> bool {
    if siblings.len() < 32 && (index >> siblings.len()) != 0 {
        return false;
    }
    compute_branch_root(leaf, siblings, index) == *root
}
