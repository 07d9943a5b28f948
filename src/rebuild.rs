// Target reconstruction from a base file and a delta.
//
// `Copy { index }` emits the base byte range `[index * L, index * L + L)`
// clamped to the base length (the final block may be short); `Literal`
// emits its bytes verbatim. A copy index outside the base's block range is
// a fatal malformed-delta error.
//
// The in-place variant must never leave a half-overwritten file behind: the
// reconstruction is staged in a temporary file next to the target and
// atomically renamed over it on success, so on any failure the original is
// fully intact.

use std::io::{self, Write};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::delta::{Delta, DeltaOp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors during reconstruction.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The delta references a base block that does not exist.
    #[error("malformed delta: copy op references block {index} but base has {blocks} blocks")]
    BlockOutOfRange { index: u32, blocks: usize },
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Reconstruct the target into a fresh buffer.
pub fn rebuild(base: &[u8], delta: &Delta) -> Result<Vec<u8>, RebuildError> {
    let mut out = Vec::with_capacity(estimated_len(base, delta));
    for op in delta.ops() {
        out.extend_from_slice(op_bytes(base, delta, op)?);
    }
    Ok(out)
}

/// Reconstruct the target into a writer. Returns the bytes written.
pub fn rebuild_to<W: Write>(base: &[u8], delta: &Delta, mut w: W) -> Result<u64, RebuildError> {
    let mut written = 0u64;
    for op in delta.ops() {
        let bytes = op_bytes(base, delta, op)?;
        w.write_all(bytes)?;
        written += bytes.len() as u64;
    }
    Ok(written)
}

/// Reconstruct over `path` in place.
///
/// The file at `path` is both the base and the destination. The whole
/// output is staged in a temporary file in the same directory and renamed
/// over the original only after every op has been applied, so a failing
/// rebuild leaves `path` untouched. The caller must ensure no concurrent
/// rebuild runs against the same path.
pub fn rebuild_in_place(path: &Path, delta: &Delta) -> Result<(), RebuildError> {
    let base = std::fs::read(path)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    let written = rebuild_to(&base, delta, &mut staged)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    debug!(
        "rebuilt {} in place: {} -> {} bytes",
        path.display(),
        base.len(),
        written
    );
    Ok(())
}

fn op_bytes<'a>(base: &'a [u8], delta: &'a Delta, op: &'a DeltaOp) -> Result<&'a [u8], RebuildError> {
    match op {
        DeltaOp::Copy { index } => {
            let block_length = delta.block_length();
            let blocks = base.len().div_ceil(block_length);
            let start = (*index as usize).checked_mul(block_length);
            match start {
                Some(start) if (*index as usize) < blocks => {
                    let end = (start + block_length).min(base.len());
                    Ok(&base[start..end])
                }
                _ => Err(RebuildError::BlockOutOfRange {
                    index: *index,
                    blocks,
                }),
            }
        }
        DeltaOp::Literal(bytes) => Ok(bytes),
    }
}

fn estimated_len(base: &[u8], delta: &Delta) -> usize {
    delta
        .ops()
        .iter()
        .map(|op| match op {
            DeltaOp::Copy { .. } => delta.block_length().min(base.len()),
            DeltaOp::Literal(bytes) => bytes.len(),
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::hash::strong::StrongAlgorithm;
    use crate::index::SignatureIndex;
    use crate::matcher;
    use crate::signature::Signature;

    fn delta_for(base: &[u8], target: &[u8], block_length: usize) -> Delta {
        let config = SyncConfig::new(block_length, StrongAlgorithm::Md4);
        let signature = Signature::generate(base, &config).unwrap();
        let index = SignatureIndex::build(&signature);
        matcher::find_delta(target, &index)
    }

    #[test]
    fn copy_and_literal_roundtrip() {
        let base = b"0123456789abcdef";
        let target = b"abcdefXYZ01234567";
        let delta = delta_for(base, target, 4);
        assert_eq!(rebuild(base, &delta).unwrap(), target);
    }

    #[test]
    fn empty_delta_empty_output() {
        let delta = delta_for(b"base", &[], 4);
        assert!(rebuild(b"base", &delta).unwrap().is_empty());
    }

    #[test]
    fn short_final_block_copies_its_true_length() {
        let base = b"aaaabb"; // block 1 is 2 bytes
        let delta = delta_for(base, base, 4);
        assert_eq!(rebuild(base, &delta).unwrap(), base);
    }

    #[test]
    fn out_of_range_copy_is_fatal() {
        let delta = Delta::new(4, vec![DeltaOp::Copy { index: 5 }]);
        let err = rebuild(b"only8byt", &delta).unwrap_err();
        assert!(matches!(
            err,
            RebuildError::BlockOutOfRange { index: 5, blocks: 2 }
        ));
    }

    #[test]
    fn copy_against_empty_base_is_fatal() {
        let delta = Delta::new(4, vec![DeltaOp::Copy { index: 0 }]);
        let err = rebuild(&[], &delta).unwrap_err();
        assert!(matches!(
            err,
            RebuildError::BlockOutOfRange { index: 0, blocks: 0 }
        ));
    }

    #[test]
    fn rebuild_to_counts_bytes() {
        let base = b"12345678";
        let target = b"5678extra1234";
        let delta = delta_for(base, target, 4);
        let mut out = Vec::new();
        let written = rebuild_to(base, &delta, &mut out).unwrap();
        assert_eq!(out, target);
        assert_eq!(written, target.len() as u64);
    }

    #[test]
    fn in_place_matches_fresh_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let base = b"the base file contents, block aligned or not".to_vec();
        let target = b"the NEW file contents, block aligned or not!!".to_vec();
        std::fs::write(&path, &base).unwrap();

        let delta = delta_for(&base, &target, 8);
        let fresh = rebuild(&base, &delta).unwrap();
        rebuild_in_place(&path, &delta).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), fresh);
        assert_eq!(fresh, target);
    }

    #[test]
    fn failed_in_place_rebuild_leaves_original_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        std::fs::write(&path, b"precious original").unwrap();

        let bad = Delta::new(4, vec![DeltaOp::Copy { index: 999 }]);
        rebuild_in_place(&path, &bad).unwrap_err();

        assert_eq!(std::fs::read(&path).unwrap(), b"precious original");
    }
}
