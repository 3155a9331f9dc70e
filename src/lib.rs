// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # stegomark-core
//!
//! Pure-Rust dynamic software watermarking. A numeric ownership signature is
//! split into Chinese Remainder Theorem residues, and each residue is hidden
//! in the host program's source text as a behaviourally inert loop that
//! recomputes it. The signature can later be recovered from the text alone,
//! given the same modulus set.
//!
//! All processing is in memory: the library takes and returns text and
//! integers and never touches the file system. The `stegomark` binary wraps
//! it with file handling.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use num_bigint::BigUint;
//! use stegomark_core::{generate, extract_and_verify, ModulusSet, Verdict};
//!
//! let moduli = ModulusSet::parse("3,5,7").unwrap();
//! let host = std::fs::read_to_string("program.py").unwrap();
//! let marked = generate(&BigUint::from(50u32), &moduli, &host).unwrap();
//! let verdict = extract_and_verify(&marked.source, &moduli, &BigUint::from(50u32));
//! assert_eq!(verdict, Verdict::Verified);
//! ```

pub mod watermark;

pub use watermark::{generate, generate_with_rng, extract_and_verify, extract_signature, Watermarked};
pub use watermark::{encode_signature, reconstruct, ResidueVector, Verdict};
pub use watermark::{parse_signature, ModulusSet, WatermarkError};
pub use watermark::estimate_capacity;
pub use watermark::fragment::StegoFragment;
