// Command-line interface for rollsync.
//
// Explicit subcommands mirroring the library pipeline:
//   signature -> delta -> patch, plus a one-shot local `sync`.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::config::{DEFAULT_BLOCK_LENGTH, SyncConfig};
use crate::hash::strong::StrongAlgorithm;
use crate::io::{self, DeltaStats, PatchStats, SignatureStats, SyncError};

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Block-level delta synchronization.
#[derive(Parser, Debug)]
#[command(
    name = "rollsync",
    version,
    about = "rsync-style block delta synchronization",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stdout.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write the block signature of a base file.
    Signature(SignatureArgs),
    /// Compute a delta from a signature file and a target file.
    Delta(DeltaArgs),
    /// Apply a delta to a base file, reconstructing the target.
    Patch(PatchArgs),
    /// Update a stale file in place from a source file.
    Sync(SyncArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrongArg {
    Md4,
    Md5,
    Sha256,
}

impl From<StrongArg> for StrongAlgorithm {
    fn from(arg: StrongArg) -> Self {
        match arg {
            StrongArg::Md4 => Self::Md4,
            StrongArg::Md5 => Self::Md5,
            StrongArg::Sha256 => Self::Sha256,
        }
    }
}

#[derive(Args, Debug)]
struct ChecksumArgs {
    /// Block size in bytes (supports K/M/G suffix).
    #[arg(long = "block-size", short = 'b', value_parser = parse_byte_size, default_value_t = DEFAULT_BLOCK_LENGTH as u64)]
    block_size: u64,

    /// Strong checksum algorithm.
    #[arg(long, value_enum, default_value_t = StrongArg::Md4)]
    strong: StrongArg,

    /// Truncate strong checksums to this many bytes.
    #[arg(long = "strong-length")]
    strong_length: Option<usize>,
}

impl ChecksumArgs {
    fn to_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(self.block_size as usize, self.strong.into());
        if let Some(len) = self.strong_length {
            config = config.with_strong_length(len);
        }
        config
    }
}

#[derive(Args, Debug)]
struct SignatureArgs {
    /// Base file to sign.
    #[arg(value_hint = ValueHint::FilePath)]
    base: PathBuf,
    /// Output signature file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
    #[command(flatten)]
    checksum: ChecksumArgs,
}

#[derive(Args, Debug)]
struct DeltaArgs {
    /// Signature file of the base.
    #[arg(value_hint = ValueHint::FilePath)]
    signature: PathBuf,
    /// Target file to express as base + delta.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,
    /// Output delta file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct PatchArgs {
    /// Base file.
    #[arg(value_hint = ValueHint::FilePath)]
    base: PathBuf,
    /// Delta file.
    #[arg(value_hint = ValueHint::FilePath)]
    delta: PathBuf,
    /// Reconstructed output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Stale file, rewritten in place.
    #[arg(value_hint = ValueHint::FilePath)]
    stale: PathBuf,
    /// Up-to-date source file.
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,
    #[command(flatten)]
    checksum: ChecksumArgs,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_signature(args: &SignatureArgs, cli: &Cli) -> i32 {
    match io::signature_file(&args.base, &args.output, &args.checksum.to_config()) {
        Ok(stats) => {
            report_signature(&stats, cli);
            0
        }
        Err(e) => fail(&e),
    }
}

fn cmd_delta(args: &DeltaArgs, cli: &Cli) -> i32 {
    match io::delta_file(&args.signature, &args.target, &args.output) {
        Ok(stats) => {
            report_delta(&stats, cli);
            0
        }
        Err(e) => fail(&e),
    }
}

fn cmd_patch(args: &PatchArgs, cli: &Cli) -> i32 {
    match io::patch_file(&args.base, &args.delta, &args.output) {
        Ok(stats) => {
            report_patch(&stats, cli);
            0
        }
        Err(e) => fail(&e),
    }
}

fn cmd_sync(args: &SyncArgs, cli: &Cli) -> i32 {
    match io::sync_in_place(&args.stale, &args.source, &args.checksum.to_config()) {
        Ok(stats) => {
            report_patch(&stats, cli);
            0
        }
        Err(e) => fail(&e),
    }
}

fn cmd_config() -> i32 {
    println!("rollsync {}", env!("CARGO_PKG_VERSION"));
    println!("default block size: {DEFAULT_BLOCK_LENGTH}");
    println!("strong algorithms: md4 (default), md5, sha256");
    0
}

fn fail(e: &SyncError) -> i32 {
    eprintln!("rollsync: {e}");
    1
}

// ---------------------------------------------------------------------------
// Stats reporting
// ---------------------------------------------------------------------------

fn report_signature(stats: &SignatureStats, cli: &Cli) {
    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "base_size": stats.base_size,
                "blocks": stats.blocks,
                "signature_size": stats.signature_size,
            })
        );
    } else if !cli.quiet {
        eprintln!(
            "signature: {} bytes, {} blocks, {} bytes framed",
            stats.base_size, stats.blocks, stats.signature_size
        );
    }
}

fn report_delta(stats: &DeltaStats, cli: &Cli) {
    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "target_size": stats.target_size,
                "delta_size": stats.delta_size,
                "copy_ops": stats.copy_ops,
                "literal_ops": stats.literal_ops,
                "literal_bytes": stats.literal_bytes,
            })
        );
    } else if !cli.quiet {
        eprintln!(
            "delta: {} target bytes -> {} delta bytes ({} copies, {} literal bytes)",
            stats.target_size, stats.delta_size, stats.copy_ops, stats.literal_bytes
        );
    }
}

fn report_patch(stats: &PatchStats, cli: &Cli) {
    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "base_size": stats.base_size,
                "output_size": stats.output_size,
                "copied_blocks": stats.copied_blocks,
                "literal_bytes": stats.literal_bytes,
            })
        );
    } else if !cli.quiet {
        eprintln!(
            "rebuilt: {} -> {} bytes ({} blocks reused, {} literal bytes)",
            stats.base_size, stats.output_size, stats.copied_blocks, stats.literal_bytes
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match &cli.command {
        Cmd::Signature(args) => cmd_signature(args, &cli),
        Cmd::Delta(args) => cmd_delta(args, &cli),
        Cmd::Patch(args) => cmd_patch(args, &cli),
        Cmd::Sync(args) => cmd_sync(args, &cli),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
