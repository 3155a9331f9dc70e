// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Watermarking CLI.
//!
//! Provides the `stegomark` binary with three subcommands:
//!
//! - `generate`: embed a signature into a host program and save the result
//! - `verify`: check a watermarked program against a claimed signature
//! - `extract`: print the signature recovered from a watermarked program
//!
//! All watermarking happens in `stegomark_core`; this binary only reads and
//! writes files. Log verbosity follows `RUST_LOG` (default `warn`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

use stegomark_core::{
    extract_and_verify, extract_signature, generate, generate_with_rng, parse_signature,
    ModulusSet, Verdict, WatermarkError,
};

/// Host file extensions accepted as input.
const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "py"];

/// Dynamic software watermarking tool.
#[derive(Parser)]
#[command(name = "stegomark", about = "Embed and verify CRT-encoded source code watermarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Embed a signature into a host program.
    Generate {
        /// Host program to watermark (.py or .txt).
        #[arg(short, long)]
        input: PathBuf,

        /// Signature to embed (non-negative integer).
        #[arg(short, long)]
        signature: String,

        /// Comma-separated, pairwise-coprime moduli, e.g. "3,5,7".
        #[arg(short, long)]
        moduli: String,

        /// Output path (default: watermarked_<input name> next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible fragment shapes and placement.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check a watermarked program against a claimed signature.
    Verify {
        /// Watermarked program (.py or .txt).
        #[arg(short, long)]
        input: PathBuf,

        /// Moduli used when the watermark was generated, in the same order.
        #[arg(short, long)]
        moduli: String,

        /// Claimed owner signature.
        #[arg(short, long)]
        signature: String,
    },
    /// Print the signature recovered from a watermarked program.
    Extract {
        /// Watermarked program (.py or .txt).
        #[arg(short, long)]
        input: PathBuf,

        /// Moduli used when the watermark was generated, in the same order.
        #[arg(short, long)]
        moduli: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Generate { input, signature, moduli, output, seed } => {
            run_generate(&input, &signature, &moduli, output, seed)
        }
        Commands::Verify { input, moduli, signature } => run_verify(&input, &moduli, &signature),
        Commands::Extract { input, moduli } => run_extract(&input, &moduli),
    };
    process::exit(exit_code);
}

/// `true` if `path` has one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
fn allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
}

/// `watermarked_<name>` in the input's directory.
fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program.py".to_string());
    input.with_file_name(format!("watermarked_{name}"))
}

/// Read a host/watermarked program, enforcing the extension filter.
///
/// Returns exit code 1 for a rejected extension and 3 for I/O errors.
fn read_program(path: &Path) -> Result<String, i32> {
    if !allowed_file(path) {
        eprintln!(
            "Error: '{}' is not a supported file type (expected .{})",
            path.display(),
            ALLOWED_EXTENSIONS.join(" or .")
        );
        return Err(1);
    }
    fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", path.display(), e);
        3
    })
}

fn report(e: &WatermarkError) -> i32 {
    eprintln!("Error: {e}");
    match e {
        WatermarkError::NoFragmentsFound | WatermarkError::ResidueCountMismatch { .. } => 2,
        _ => 1,
    }
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 = success, 1 = invalid input, 3 = I/O error.
fn run_generate(
    input: &Path,
    signature: &str,
    moduli: &str,
    output: Option<PathBuf>,
    seed: Option<u64>,
) -> i32 {
    let host = match read_program(input) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let parsed = parse_signature(signature).and_then(|s| Ok((s, ModulusSet::parse(moduli)?)));
    let (signature, moduli) = match parsed {
        Ok(v) => v,
        Err(e) => return report(&e),
    };

    let result = match seed {
        Some(seed) => {
            generate_with_rng(&signature, &moduli, &host, &mut ChaCha20Rng::seed_from_u64(seed))
        }
        None => generate(&signature, &moduli, &host),
    };
    let marked = match result {
        Ok(m) => m,
        Err(e) => return report(&e),
    };

    println!("Product of moduli: {}", marked.product);
    if !marked.is_complete() {
        eprintln!(
            "Warning: only {} of {} residues embedded; add function definitions or use fewer moduli",
            marked.embedded, marked.residues
        );
    }

    let out_path = output.unwrap_or_else(|| default_output_path(input));
    if let Err(e) = fs::write(&out_path, &marked.source) {
        eprintln!("Error: failed to write '{}': {}", out_path.display(), e);
        return 3;
    }
    println!("Watermarked program written to: {}", out_path.display());
    0
}

/// Execute the verify subcommand.
///
/// Returns exit code: 0 = verified, 1 = invalid input, 2 = not the owner,
/// 3 = I/O error.
fn run_verify(input: &Path, moduli: &str, signature: &str) -> i32 {
    let text = match read_program(input) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let parsed = ModulusSet::parse(moduli).and_then(|m| Ok((m, parse_signature(signature)?)));
    let (moduli, claimed) = match parsed {
        Ok(v) => v,
        Err(e) => return report(&e),
    };

    let verdict = extract_and_verify(&text, &moduli, &claimed);
    println!("{verdict}");
    match verdict {
        Verdict::Verified => 0,
        Verdict::NotTheOwner => 2,
    }
}

/// Execute the extract subcommand.
///
/// Returns exit code: 0 = recovered, 1 = invalid input, 2 = watermark
/// missing or incomplete, 3 = I/O error.
fn run_extract(input: &Path, moduli: &str) -> i32 {
    let text = match read_program(input) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let moduli = match ModulusSet::parse(moduli) {
        Ok(m) => m,
        Err(e) => return report(&e),
    };
    match extract_signature(&text, &moduli) {
        Ok(signature) => {
            println!("Extracted signature: {signature}");
            0
        }
        Err(e) => report(&e),
    }
}
