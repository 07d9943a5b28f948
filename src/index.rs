// Weak-sum candidate index over a signature.
//
// Maps weak checksum values to the base blocks sharing them. Built once per
// signature, read-only afterwards; the matcher probes it per window and
// strong-verifies every candidate, so weak collisions are expected and
// harmless. Because blocks are inserted in file order, each bucket lists
// candidate indices ascending — the matcher's lowest-index tie-break falls
// out of iteration order.

use std::collections::HashMap;

use crate::signature::{BlockSignature, Signature};

/// Read-only lookup structure from weak checksum to candidate block indices.
///
/// Borrows the signature it was built from; safe to share across concurrent
/// matcher runs against the same base file.
#[derive(Debug)]
pub struct SignatureIndex<'a> {
    signature: &'a Signature,
    buckets: HashMap<u32, Vec<u32>>,
}

impl<'a> SignatureIndex<'a> {
    /// Build the index from a completed signature.
    pub fn build(signature: &'a Signature) -> Self {
        let mut buckets: HashMap<u32, Vec<u32>> = HashMap::with_capacity(signature.block_count());
        for block in signature.blocks() {
            buckets.entry(block.weak).or_default().push(block.index);
        }
        Self { signature, buckets }
    }

    /// Candidate block indices for a weak checksum, ascending; empty when no
    /// block has this weak sum.
    #[inline]
    pub fn lookup(&self, weak: u32) -> &[u32] {
        self.buckets.get(&weak).map_or(&[], Vec::as_slice)
    }

    /// The signature this index was built from.
    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    /// The block signature for a candidate index returned by `lookup`.
    #[inline]
    pub fn block(&self, index: u32) -> &'a BlockSignature {
        &self.signature.blocks()[index as usize]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::hash::rolling::Rolling32;
    use crate::hash::strong::StrongAlgorithm;

    fn sig(data: &[u8], block_length: usize) -> Signature {
        let cfg = SyncConfig::new(block_length, StrongAlgorithm::Md4);
        Signature::generate(data, &cfg).unwrap()
    }

    #[test]
    fn lookup_hits_and_misses() {
        let data = b"aaaabbbbcccc";
        let signature = sig(data, 4);
        let index = SignatureIndex::build(&signature);

        let weak = Rolling32::compute(b"bbbb");
        assert_eq!(index.lookup(weak), &[1]);
        assert!(index.lookup(weak.wrapping_add(1)).is_empty());
    }

    #[test]
    fn duplicate_blocks_share_a_bucket_in_order() {
        // Four identical blocks: one bucket with ascending indices.
        let data = vec![0x5Au8; 16];
        let signature = sig(&data, 4);
        let index = SignatureIndex::build(&signature);

        let weak = signature.blocks()[0].weak;
        assert_eq!(index.lookup(weak), &[0, 1, 2, 3]);
    }

    #[test]
    fn empty_signature_empty_index() {
        let signature = sig(&[], 4);
        let index = SignatureIndex::build(&signature);
        assert!(index.lookup(0).is_empty());
    }

    #[test]
    fn block_accessor_returns_indexed_block() {
        let data = b"0123456789";
        let signature = sig(data, 5);
        let index = SignatureIndex::build(&signature);
        let weak = Rolling32::compute(b"56789");
        let cand = index.lookup(weak)[0];
        assert_eq!(index.block(cand).index, 1);
        assert_eq!(index.block(cand).len, 5);
    }
}
