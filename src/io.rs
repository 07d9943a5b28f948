// File-level helpers for delta synchronization.
//
// Wraps the in-memory core with buffered file I/O:
//   - `signature_file` — base file -> framed signature file
//   - `delta_file`     — signature file + target file -> framed delta file
//   - `patch_file`     — base file + delta file -> reconstructed file
//   - `sync_in_place`  — one-shot local sync: bring a stale file up to date
//     against a source file, rewriting the stale file in place
//
// Files are read fully into memory; I/O errors propagate unmodified and no
// helper retries on the caller's behalf.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::config::{ConfigError, SyncConfig};
use crate::delta::{Delta, DeltaFormatError};
use crate::index::SignatureIndex;
use crate::matcher;
use crate::rebuild::{self, RebuildError};
use crate::signature::{Signature, SignatureFormatError};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Umbrella error for the file-level helpers.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    SignatureFormat(#[from] SignatureFormatError),
    #[error(transparent)]
    DeltaFormat(#[from] DeltaFormatError),
    #[error(transparent)]
    Rebuild(#[from] RebuildError),
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `signature_file()`.
#[derive(Debug, Clone)]
pub struct SignatureStats {
    /// Base file size in bytes.
    pub base_size: u64,
    /// Number of blocks in the signature.
    pub blocks: usize,
    /// Framed signature size in bytes.
    pub signature_size: u64,
}

/// Statistics returned by `delta_file()`.
#[derive(Debug, Clone)]
pub struct DeltaStats {
    /// Target file size in bytes.
    pub target_size: u64,
    /// Framed delta size in bytes.
    pub delta_size: u64,
    /// Number of copy ops (reused base blocks).
    pub copy_ops: usize,
    /// Number of literal ops.
    pub literal_ops: usize,
    /// Total literal payload bytes.
    pub literal_bytes: u64,
}

/// Statistics returned by `patch_file()` and `sync_in_place()`.
#[derive(Debug, Clone)]
pub struct PatchStats {
    /// Base file size in bytes.
    pub base_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of base blocks reused by the delta.
    pub copied_blocks: usize,
    /// Bytes that had to travel as literals.
    pub literal_bytes: u64,
}

// ---------------------------------------------------------------------------
// signature_file
// ---------------------------------------------------------------------------

/// Generate the signature of `base_path` and write it framed to `sig_path`.
pub fn signature_file(
    base_path: &Path,
    sig_path: &Path,
    config: &SyncConfig,
) -> Result<SignatureStats, SyncError> {
    config.validate()?;

    let base = std::fs::read(base_path)?;
    let signature = Signature::generate(&base, config)?;

    let file = File::create(sig_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
    signature.write_to(&mut writer)?;
    writer.flush()?;

    let signature_size = std::fs::metadata(sig_path)?.len();
    debug!(
        "signature of {}: {} blocks, {} bytes",
        base_path.display(),
        signature.block_count(),
        signature_size
    );
    Ok(SignatureStats {
        base_size: base.len() as u64,
        blocks: signature.block_count(),
        signature_size,
    })
}

// ---------------------------------------------------------------------------
// delta_file
// ---------------------------------------------------------------------------

/// Compute the delta of `target_path` against a framed signature file and
/// write it framed to `delta_path`.
pub fn delta_file(
    sig_path: &Path,
    target_path: &Path,
    delta_path: &Path,
) -> Result<DeltaStats, SyncError> {
    let sig_file = File::open(sig_path)?;
    let signature = Signature::read_from(BufReader::with_capacity(BUF_SIZE, sig_file))?;
    let index = SignatureIndex::build(&signature);

    let target = std::fs::read(target_path)?;
    let delta = matcher::find_delta(&target, &index);

    let file = File::create(delta_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
    delta.write_to(&mut writer)?;
    writer.flush()?;

    let delta_size = std::fs::metadata(delta_path)?.len();
    debug!(
        "delta for {}: {} copies, {} literal bytes, {} bytes framed",
        target_path.display(),
        delta.copy_ops(),
        delta.literal_bytes(),
        delta_size
    );
    Ok(DeltaStats {
        target_size: target.len() as u64,
        delta_size,
        copy_ops: delta.copy_ops(),
        literal_ops: delta.literal_ops(),
        literal_bytes: delta.literal_bytes(),
    })
}

// ---------------------------------------------------------------------------
// patch_file
// ---------------------------------------------------------------------------

/// Apply a framed delta file to `base_path`, writing the reconstruction to
/// `output_path`.
pub fn patch_file(
    base_path: &Path,
    delta_path: &Path,
    output_path: &Path,
) -> Result<PatchStats, SyncError> {
    let delta_in = File::open(delta_path)?;
    let delta = Delta::read_from(BufReader::with_capacity(BUF_SIZE, delta_in))?;

    let base = std::fs::read(base_path)?;
    let file = File::create(output_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
    let output_size = rebuild::rebuild_to(&base, &delta, &mut writer)?;
    writer.flush()?;

    Ok(PatchStats {
        base_size: base.len() as u64,
        output_size,
        copied_blocks: delta.copy_ops(),
        literal_bytes: delta.literal_bytes(),
    })
}

// ---------------------------------------------------------------------------
// sync_in_place
// ---------------------------------------------------------------------------

/// Bring `stale_path` up to date with `source_path` in place.
///
/// The full local pipeline: signature of the stale file, delta of the source
/// against it, in-place rebuild of the stale file. On any failure the stale
/// file is left fully intact. The caller must ensure nothing else rebuilds
/// the same path concurrently.
pub fn sync_in_place(
    stale_path: &Path,
    source_path: &Path,
    config: &SyncConfig,
) -> Result<PatchStats, SyncError> {
    config.validate()?;

    let stale = std::fs::read(stale_path)?;
    let signature = Signature::generate(&stale, config)?;
    let index = SignatureIndex::build(&signature);

    let source = std::fs::read(source_path)?;
    let delta = matcher::find_delta(&source, &index);
    rebuild::rebuild_in_place(stale_path, &delta)?;

    info!(
        "synced {} from {}: reused {} of {} blocks, {} literal bytes",
        stale_path.display(),
        source_path.display(),
        delta.copy_ops(),
        signature.block_count(),
        delta.literal_bytes()
    );
    Ok(PatchStats {
        base_size: stale.len() as u64,
        output_size: source.len() as u64,
        copied_blocks: delta.copy_ops(),
        literal_bytes: delta.literal_bytes(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
