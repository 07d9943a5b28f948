// Delta representation and file framing.
//
// A delta is an ordered op sequence; concatenating the byte ranges the ops
// denote (base block bytes for `Copy`, inline bytes for `Literal`)
// reproduces the target exactly. The framing is a tagged record stream:
//
//   "RDL1" ‖ block_length:u32 ‖ op_count:u32 ‖ ops…
//   op := 0x00 ‖ index:u32            (copy base block `index`)
//       | 0x01 ‖ len:u32 ‖ len bytes  (literal insertion)
//
// All integers big-endian.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Magic prefix of a framed delta.
pub const DELTA_MAGIC: [u8; 4] = *b"RDL1";

const TAG_COPY: u8 = 0x00;
const TAG_LITERAL: u8 = 0x01;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors while reading a framed delta.
#[derive(Debug, Error)]
pub enum DeltaFormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("bad magic: not a rollsync delta")]
    BadMagic,
    #[error("zero block length in delta header")]
    ZeroBlockLength,
    #[error("unknown op tag {0:#04x}")]
    UnknownTag(u8),
}

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// One reconstruction instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Reuse base block `index` verbatim.
    Copy { index: u32 },
    /// Insert these bytes verbatim; they were not matched in the base.
    Literal(Vec<u8>),
}

/// Ordered reconstruction instructions plus the block length they are
/// expressed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    block_length: usize,
    ops: Vec<DeltaOp>,
}

impl Delta {
    pub(crate) fn new(block_length: usize, ops: Vec<DeltaOp>) -> Self {
        Self { block_length, ops }
    }

    /// Block length of the signature this delta was matched against.
    pub fn block_length(&self) -> usize {
        self.block_length
    }

    /// Ops in reconstruction order.
    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of `Copy` ops.
    pub fn copy_ops(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DeltaOp::Copy { .. }))
            .count()
    }

    /// Number of `Literal` ops.
    pub fn literal_ops(&self) -> usize {
        self.ops.len() - self.copy_ops()
    }

    /// Total bytes carried inline by `Literal` ops.
    pub fn literal_bytes(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Literal(bytes) => bytes.len() as u64,
                DeltaOp::Copy { .. } => 0,
            })
            .sum()
    }

    // -----------------------------------------------------------------------
    // Framing
    // -----------------------------------------------------------------------

    /// Write the framed delta.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_all(&DELTA_MAGIC)?;
        w.write_all(&u32_or_invalid(self.block_length, "block length")?.to_be_bytes())?;
        w.write_all(&u32_or_invalid(self.ops.len(), "op count")?.to_be_bytes())?;
        for op in &self.ops {
            match op {
                DeltaOp::Copy { index } => {
                    w.write_all(&[TAG_COPY])?;
                    w.write_all(&index.to_be_bytes())?;
                }
                DeltaOp::Literal(bytes) => {
                    w.write_all(&[TAG_LITERAL])?;
                    w.write_all(&u32_or_invalid(bytes.len(), "literal length")?.to_be_bytes())?;
                    w.write_all(bytes)?;
                }
            }
        }
        Ok(())
    }

    /// Read a framed delta.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, DeltaFormatError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != DELTA_MAGIC {
            return Err(DeltaFormatError::BadMagic);
        }

        let block_length = read_u32(&mut r)? as usize;
        if block_length == 0 {
            return Err(DeltaFormatError::ZeroBlockLength);
        }
        let count = read_u32(&mut r)? as usize;

        let mut ops = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            let mut tag = [0u8; 1];
            r.read_exact(&mut tag)?;
            match tag[0] {
                TAG_COPY => {
                    let index = read_u32(&mut r)?;
                    ops.push(DeltaOp::Copy { index });
                }
                TAG_LITERAL => {
                    let len = read_u32(&mut r)? as usize;
                    let mut bytes = vec![0u8; len];
                    r.read_exact(&mut bytes)?;
                    ops.push(DeltaOp::Literal(bytes));
                }
                other => return Err(DeltaFormatError::UnknownTag(other)),
            }
        }

        Ok(Self { block_length, ops })
    }
}

fn u32_or_invalid(value: usize, what: &str) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} {value} exceeds the 32-bit framing limit"),
        )
    })
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
