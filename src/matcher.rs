// Target scanning: signature index in, delta out.
//
// Single sequential pass over the target. A rolling weak checksum covers a
// window of one block length; each position probes the index and
// strong-verifies candidates in ascending block-index order (lowest index
// wins on ties). A match flushes the pending literal buffer, emits a copy
// op, and jumps a full window — no overlap re-scan inside a matched region.
// A miss pushes one byte into the pending literal buffer and rolls the
// checksum forward, which keeps the scan linear in the target length.
//
// A weak hit whose strong sum disagrees is not an error: it costs one
// strong-hash computation and the scan continues byte-by-byte. Output is
// fully deterministic for fixed inputs and configuration.

use std::mem;

use log::debug;

use crate::delta::{Delta, DeltaOp};
use crate::hash::rolling::Rolling32;
use crate::index::SignatureIndex;

/// Compute the delta expressing `target` in terms of the index's base file.
///
/// The signature (and configuration) travel with the index. An empty target
/// yields an empty delta.
pub fn find_delta(target: &[u8], index: &SignatureIndex<'_>) -> Delta {
    let config = index.signature().config();
    let block_length = config.block_length;

    let mut ops: Vec<DeltaOp> = Vec::new();
    let mut literal: Vec<u8> = Vec::new();
    let mut weak = Rolling32::new();
    let mut pos = 0usize;

    // Full-window phase: at least one whole block remains.
    let mut seeded = false;
    while pos + block_length <= target.len() {
        let window = &target[pos..pos + block_length];
        if !seeded {
            weak.seed(window);
            seeded = true;
        }
        if let Some(block) = verify_window(index, weak.digest(), window) {
            flush_literal(&mut ops, &mut literal);
            ops.push(DeltaOp::Copy { index: block });
            pos += block_length;
            seeded = false;
        } else {
            literal.push(target[pos]);
            if pos + block_length < target.len() {
                weak.roll(target[pos], target[pos + block_length]);
            }
            pos += 1;
        }
    }

    // Tail phase: fewer bytes than one block remain. The window is the whole
    // tail and can only match a base block of exactly its length; on a miss
    // it shrinks from the front.
    if pos < target.len() {
        weak.seed(&target[pos..]);
        while pos < target.len() {
            let window = &target[pos..];
            if let Some(block) = verify_window(index, weak.digest(), window) {
                flush_literal(&mut ops, &mut literal);
                ops.push(DeltaOp::Copy { index: block });
                break;
            }
            literal.push(target[pos]);
            weak.roll_out(target[pos]);
            pos += 1;
        }
    }

    flush_literal(&mut ops, &mut literal);

    let delta = Delta::new(block_length, ops);
    debug!(
        "matched {} blocks, {} literal bytes over {} target bytes",
        delta.copy_ops(),
        delta.literal_bytes(),
        target.len()
    );
    delta
}

/// Strong-verify the index candidates for `weak` against `window`.
///
/// Returns the lowest matching block index. The window's strong sum is
/// computed at most once, on the first length-compatible candidate.
fn verify_window(index: &SignatureIndex<'_>, weak: u32, window: &[u8]) -> Option<u32> {
    let config = index.signature().config();
    let mut window_strong: Option<Vec<u8>> = None;

    for &candidate in index.lookup(weak) {
        let block = index.block(candidate);
        if block.len != window.len() {
            continue;
        }
        let strong = window_strong
            .get_or_insert_with(|| config.strong.compute(window, config.strong_length));
        if *strong == block.strong {
            return Some(candidate);
        }
    }
    None
}

fn flush_literal(ops: &mut Vec<DeltaOp>, literal: &mut Vec<u8>) {
    if !literal.is_empty() {
        ops.push(DeltaOp::Literal(mem::take(literal)));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
