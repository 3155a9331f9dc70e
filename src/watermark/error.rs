// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the watermarking pipeline.
//!
//! [`WatermarkError`] covers input validation (moduli and signature text),
//! encoding capacity, and the strict extraction checks. The lenient
//! verification entry point never returns these; it folds every failure into
//! [`Verdict::NotTheOwner`](crate::watermark::Verdict::NotTheOwner).

use core::fmt;

use num_bigint::BigUint;

/// Errors that can occur while generating or extracting a watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// The moduli text is not a comma-separated list of positive integers.
    MalformedModuli(String),
    /// The signature text is not a non-negative integer.
    MalformedSignature(String),
    /// Two moduli share a common factor, so CRT reconstruction is not unique.
    NonCoprimeModuli {
        first: BigUint,
        second: BigUint,
    },
    /// The product of the moduli does not exceed the signature.
    InsufficientModulus {
        product: BigUint,
    },
    /// No stego fragment was found in the scanned text.
    NoFragmentsFound,
    /// The fragments found do not cover exactly one residue per modulus.
    ResidueCountMismatch {
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedModuli(msg) => write!(f, "malformed moduli list: {msg}"),
            Self::MalformedSignature(msg) => write!(f, "malformed signature: {msg}"),
            Self::NonCoprimeModuli { first, second } => {
                write!(f, "moduli {first} and {second} are not coprime")
            }
            Self::InsufficientModulus { product } => write!(
                f,
                "product of moduli ({product}) must exceed the signature; supply larger or more moduli"
            ),
            Self::NoFragmentsFound => write!(f, "no watermark fragments found"),
            Self::ResidueCountMismatch { expected, found } => {
                write!(f, "expected {expected} watermark fragments, found {found}")
            }
        }
    }
}

impl std::error::Error for WatermarkError {}
