// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embedding capacity of a host program.
//!
//! Each segment carries at most one fragment, so a host with `m` function
//! headers holds at most `m + 1` residues. A modulus set larger than that
//! embeds only a prefix of the residue vector.

use crate::watermark::moduli::ModulusSet;
use crate::watermark::planner::HostProgram;

/// Maximum number of fragments (residues) `host` can carry.
pub fn estimate_capacity(host: &str) -> usize {
    HostProgram::parse(host).segments().len()
}

/// `true` if every residue of `moduli` would find a segment in `host`.
pub fn fits(host: &str, moduli: &ModulusSet) -> bool {
    estimate_capacity(host) >= moduli.len()
}
