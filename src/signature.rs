// Base-file signatures: per-block (weak, strong) checksum pairs.
//
// `Signature::generate` partitions the base into `block_length` blocks (the
// final block may be shorter) and records one `BlockSignature` per block in
// file order. Block checksums are independent, so generation can fan out to
// a rayon pool (`parallel` feature) as long as the result keeps block order.
//
// The module also defines the signature file framing:
//
//   "RSG1" ‖ block_length:u32 ‖ base_len:u64 ‖ algorithm:u8 ‖
//   strong_length:u8 ‖ count:u32 ‖ count × (weak:u32 ‖ strong bytes)
//
// All integers big-endian. `base_len` makes the short final block's length
// recoverable without the base file; `count` is redundant but checked.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::config::{ConfigError, SyncConfig};
use crate::hash::rolling::Rolling32;
use crate::hash::strong::StrongAlgorithm;

/// Magic prefix of a framed signature.
pub const SIGNATURE_MAGIC: [u8; 4] = *b"RSG1";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors while reading a framed signature.
#[derive(Debug, Error)]
pub enum SignatureFormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("bad magic: not a rollsync signature")]
    BadMagic,
    #[error("unknown strong algorithm id {0:#04x}")]
    UnknownAlgorithm(u8),
    #[error("invalid signature configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("block count {count} does not cover base length {base_len} at block length {block_length}")]
    InconsistentBlockCount {
        count: u32,
        base_len: u64,
        block_length: usize,
    },
}

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Checksums of one base-file block. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    /// Position of the block in the base file (block `i` starts at
    /// `i * block_length`).
    pub index: u32,
    /// Weak rolling checksum of the block bytes.
    pub weak: u32,
    /// Strong checksum, `strong_length` bytes.
    pub strong: Vec<u8>,
    /// Actual byte count of this block; equals `block_length` everywhere
    /// except possibly the final block.
    pub len: usize,
}

/// Ordered per-block checksums of a base file plus the session configuration
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    config: SyncConfig,
    base_len: u64,
    blocks: Vec<BlockSignature>,
}

impl Signature {
    /// Compute the signature of `base` under `config`.
    ///
    /// A zero-length input yields an empty signature. Pure function of its
    /// inputs; the configuration is validated before any hashing.
    pub fn generate(base: &[u8], config: &SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if u32::try_from(base.len().div_ceil(config.block_length)).is_err() {
            return Err(ConfigError::TooManyBlocks {
                len: base.len(),
                block_length: config.block_length,
            });
        }

        let blocks = hash_blocks(base, config);
        Ok(Self {
            config: config.clone(),
            base_len: base.len() as u64,
            blocks,
        })
    }

    /// The configuration this signature was generated with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Length of the base file in bytes.
    pub fn base_len(&self) -> u64 {
        self.base_len
    }

    /// Blocks in base-file order.
    pub fn blocks(&self) -> &[BlockSignature] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // -----------------------------------------------------------------------
    // Framing
    // -----------------------------------------------------------------------

    /// Write the framed signature.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        let block_length = u32::try_from(self.config.block_length).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "block length exceeds the 32-bit framing limit",
            )
        })?;
        w.write_all(&SIGNATURE_MAGIC)?;
        w.write_all(&block_length.to_be_bytes())?;
        w.write_all(&self.base_len.to_be_bytes())?;
        w.write_all(&[self.config.strong.id(), self.config.strong_length as u8])?;
        w.write_all(&(self.blocks.len() as u32).to_be_bytes())?;
        for block in &self.blocks {
            w.write_all(&block.weak.to_be_bytes())?;
            w.write_all(&block.strong)?;
        }
        Ok(())
    }

    /// Read a framed signature.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, SignatureFormatError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != SIGNATURE_MAGIC {
            return Err(SignatureFormatError::BadMagic);
        }

        let block_length = read_u32(&mut r)? as usize;
        let base_len = read_u64(&mut r)?;
        let mut meta = [0u8; 2];
        r.read_exact(&mut meta)?;
        let strong = StrongAlgorithm::from_id(meta[0])
            .ok_or(SignatureFormatError::UnknownAlgorithm(meta[0]))?;
        let strong_length = meta[1] as usize;
        let count = read_u32(&mut r)?;

        let config = SyncConfig {
            block_length,
            strong,
            strong_length,
        };
        config.validate()?;

        let expected = base_len.div_ceil(block_length as u64);
        if u64::from(count) != expected {
            return Err(SignatureFormatError::InconsistentBlockCount {
                count,
                base_len,
                block_length,
            });
        }

        let mut blocks = Vec::with_capacity((count as usize).min(1 << 16));
        for index in 0..count {
            let weak = read_u32(&mut r)?;
            let mut strong_sum = vec![0u8; strong_length];
            r.read_exact(&mut strong_sum)?;
            let start = u64::from(index) * block_length as u64;
            let len = (base_len - start).min(block_length as u64) as usize;
            blocks.push(BlockSignature {
                index,
                weak,
                strong: strong_sum,
                len,
            });
        }

        Ok(Self {
            config,
            base_len,
            blocks,
        })
    }
}

// ---------------------------------------------------------------------------
// Block hashing
// ---------------------------------------------------------------------------

fn block_signature(index: usize, chunk: &[u8], config: &SyncConfig) -> BlockSignature {
    BlockSignature {
        index: index as u32,
        weak: Rolling32::compute(chunk),
        strong: config.strong.compute(chunk, config.strong_length),
        len: chunk.len(),
    }
}

#[cfg(not(feature = "parallel"))]
fn hash_blocks(base: &[u8], config: &SyncConfig) -> Vec<BlockSignature> {
    base.chunks(config.block_length)
        .enumerate()
        .map(|(i, chunk)| block_signature(i, chunk, config))
        .collect()
}

/// Parallel block hashing. Indexed collection preserves block order.
#[cfg(feature = "parallel")]
fn hash_blocks(base: &[u8], config: &SyncConfig) -> Vec<BlockSignature> {
    use rayon::prelude::*;

    base.par_chunks(config.block_length)
        .enumerate()
        .map(|(i, chunk)| block_signature(i, chunk, config))
        .collect()
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
