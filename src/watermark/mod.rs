// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Dynamic software watermarking pipelines.
//!
//! A signature is split into CRT residues over a pairwise-coprime modulus
//! set. Each residue becomes a small self-computing loop ("stego fragment")
//! spliced into its own function segment of the host source:
//!
//! - **Generate** (`generate` / `generate_with_rng`): encode, synthesize,
//!   plan, embed. Returns the watermarked text.
//! - **Extract/verify** (`extract_signature` / `extract_and_verify`): scan
//!   the text for fragments, recompute the residues from their literals, and
//!   CRT-reconstruct the signature. The host program is never executed.
//!
//! Both sides must use the same modulus set in the same order; nothing in the
//! watermarked text identifies it.

pub mod error;
pub mod moduli;
pub mod crt;
pub mod fragment;
pub mod planner;
pub mod capacity;
pub mod embed;
pub mod extract;
mod pipeline;

pub use error::WatermarkError;

/// Smallest loop count drawn for a fragment.
pub const MIN_ITERATIONS: u32 = 5;

/// Largest loop count drawn for a fragment.
pub const MAX_ITERATIONS: u32 = 20;

/// Smallest per-iteration increment drawn for a fragment.
pub const MIN_STEP: u32 = 1;

/// Largest per-iteration increment drawn for a fragment.
pub const MAX_STEP: u32 = 10;

/// Deepest indentation (in whitespace characters) at which a fragment may
/// be spliced. Anything deeper risks landing inside another block.
pub const MAX_INSERT_INDENT: usize = 1;

/// Fragment variables are named `{VARIABLE_PREFIX}{residue index}`.
pub const VARIABLE_PREFIX: &str = "W";

/// Keyword that starts a function definition header.
pub const HEADER_KEYWORD: &str = "def";

/// Trailing token of a line that opens a nested block.
pub const BLOCK_OPENER: char = ':';

/// Line comment marker of the host language.
pub const COMMENT_PREFIX: &str = "#";

/// Indentation of the loop body line inside a fragment.
pub const FRAGMENT_BODY_INDENT: usize = 2;

pub use pipeline::{extract_and_verify, extract_signature, generate, generate_with_rng, Watermarked};
pub use crt::{encode_signature, reconstruct, ResidueVector, Verdict};
pub use moduli::{parse_signature, ModulusSet};
pub use capacity::estimate_capacity;

