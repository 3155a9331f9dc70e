// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Stego fragment synthesis.
//!
//! Each residue `b` becomes a three-statement block that recomputes `b` at
//! run time through a counted loop:
//!
//! ```text
//! W{i} = {b - r*k}
//! for _ in range({k}):
//!   W{i} += {r}
//! ```
//!
//! `k` and `r` are drawn per fragment purely to vary the surface form; only
//! `init + k*r` carries information. The variable name carries the residue
//! index so that extraction can pair each fragment with its modulus.

use core::fmt;

use num_bigint::{BigInt, BigUint};
use rand::Rng;

use crate::watermark::crt::ResidueVector;
use crate::watermark::{
    FRAGMENT_BODY_INDENT, MAX_ITERATIONS, MAX_STEP, MIN_ITERATIONS, MIN_STEP, VARIABLE_PREFIX,
};

/// A behaviourally inert code block evaluating to one residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StegoFragment {
    index: usize,
    initial_value: BigInt,
    iterations: u32,
    step: u32,
}

impl StegoFragment {
    /// Synthesize the fragment for residue number `index`, drawing the loop
    /// count from `MIN_ITERATIONS..=MAX_ITERATIONS` and the increment from
    /// `MIN_STEP..=MAX_STEP`.
    ///
    /// Ranges are drawn as `u32` so a seeded generator yields the same
    /// fragment on every platform.
    pub fn synthesize<R: Rng + ?Sized>(index: usize, residue: &BigUint, rng: &mut R) -> Self {
        let iterations = rng.gen_range(MIN_ITERATIONS..=MAX_ITERATIONS);
        let step = rng.gen_range(MIN_STEP..=MAX_STEP);
        Self::with_shape(index, residue, iterations, step)
    }

    /// Build a fragment with an explicit loop count and increment.
    pub fn with_shape(index: usize, residue: &BigUint, iterations: u32, step: u32) -> Self {
        let offset = BigInt::from(u64::from(iterations) * u64::from(step));
        Self {
            index,
            initial_value: BigInt::from(residue.clone()) - offset,
            iterations,
            step,
        }
    }

    /// Position of the encoded residue in the residue vector.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn initial_value(&self) -> &BigInt {
        &self.initial_value
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// The uniquely indexed variable name, e.g. `W0`.
    pub fn variable(&self) -> String {
        format!("{VARIABLE_PREFIX}{}", self.index)
    }

    /// Value the fragment leaves in its variable: `init + k*r`.
    pub fn evaluate(&self) -> BigInt {
        &self.initial_value + BigInt::from(u64::from(self.iterations) * u64::from(self.step))
    }

    /// Source lines without any leading indentation of their own context.
    pub fn lines(&self) -> Vec<String> {
        let var = self.variable();
        vec![
            format!("{var} = {}", self.initial_value),
            format!("for _ in range({}):", self.iterations),
            format!("{}{var} += {}", " ".repeat(FRAGMENT_BODY_INDENT), self.step),
        ]
    }
}

impl fmt::Display for StegoFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// One fresh fragment per residue, indexed by residue position.
pub fn synthesize_all<R: Rng + ?Sized>(residues: &ResidueVector, rng: &mut R) -> Vec<StegoFragment> {
    residues
        .residues()
        .iter()
        .enumerate()
        .map(|(i, b)| StegoFragment::synthesize(i, b, rng))
        .collect()
}
