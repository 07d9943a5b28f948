//! Rollsync: block-level delta synchronization (the rsync algorithm family).
//!
//! The crate computes a compact per-block *signature* of a base file, scans a
//! target file against it with a rolling weak checksum, verifies candidate
//! matches with a strong digest, and emits a *delta* of copy/literal
//! operations that reconstructs the target from the base.
//!
//! - Checksum primitives (`hash`)
//! - Signature generation and framing (`signature`)
//! - Weak-sum candidate index (`index`)
//! - Delta computation (`matcher`) and representation (`delta`)
//! - Target reconstruction, including safe in-place rebuild (`rebuild`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use rollsync::config::SyncConfig;
//! use rollsync::index::SignatureIndex;
//! use rollsync::signature::Signature;
//! use rollsync::{matcher, rebuild};
//!
//! let base = b"the quick brown fox jumps over the lazy dog";
//! let target = b"the quick red fox jumps over the lazy dog!";
//!
//! let config = SyncConfig::new(8, Default::default());
//! let signature = Signature::generate(base, &config).unwrap();
//! let index = SignatureIndex::build(&signature);
//! let delta = matcher::find_delta(target, &index);
//! let rebuilt = rebuild::rebuild(base, &delta).unwrap();
//! assert_eq!(rebuilt, target);
//! ```

pub mod config;
pub mod delta;
pub mod hash;
pub mod index;
pub mod io;
pub mod matcher;
pub mod rebuild;
pub mod signature;

#[cfg(feature = "cli")]
pub mod cli;
