// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Generate and extract/verify pipelines.
//!
//! Generate:
//! 1. CRT-encode the signature against the modulus set
//! 2. Synthesize one fragment per residue
//! 3. Segment the host at function headers and plan one splice point per segment
//! 4. Splice fragment `i` into segment `i`
//!
//! Extract/verify:
//! 1. Tokenize the text and collect fragments by index
//! 2. Recompute each residue from the fragment literals
//! 3. CRT-reconstruct and compare with the claimed signature

use num_bigint::BigUint;
use rand::Rng;
use tracing::{debug, warn};

use crate::watermark::crt::{self, Verdict};
use crate::watermark::embed;
use crate::watermark::error::WatermarkError;
use crate::watermark::extract::{self, ExtractedResidues};
use crate::watermark::fragment;
use crate::watermark::moduli::ModulusSet;
use crate::watermark::planner::{self, HostProgram};

/// Result of a generate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermarked {
    /// Host text with the fragments spliced in.
    pub source: String,
    /// Product of the moduli (exclusive bound on the signature).
    pub product: BigUint,
    /// Number of residues the signature was split into.
    pub residues: usize,
    /// Number of fragments actually embedded.
    pub embedded: usize,
}

impl Watermarked {
    /// `false` if the host had fewer segments than residues, in which case
    /// the signature cannot be recovered from this text.
    pub fn is_complete(&self) -> bool {
        self.embedded == self.residues
    }
}

/// Embed `signature` into `host` using a thread-local random source.
///
/// # Errors
/// Returns [`WatermarkError::InsufficientModulus`] if the product of the
/// moduli does not exceed the signature. An under-capacity host is not an
/// error; see [`Watermarked::is_complete`].
pub fn generate(
    signature: &BigUint,
    moduli: &ModulusSet,
    host: &str,
) -> Result<Watermarked, WatermarkError> {
    generate_with_rng(signature, moduli, host, &mut rand::thread_rng())
}

/// [`generate`] with a caller-supplied random source, e.g. a seeded
/// `ChaCha20Rng` for reproducible output.
pub fn generate_with_rng<R: Rng + ?Sized>(
    signature: &BigUint,
    moduli: &ModulusSet,
    host: &str,
    rng: &mut R,
) -> Result<Watermarked, WatermarkError> {
    let encoded = crt::encode_signature(signature, moduli)?;
    let fragments = fragment::synthesize_all(&encoded, rng);

    let program = HostProgram::parse(host);
    let points = planner::plan_insertions(&program, fragments.len(), rng);
    let source = embed::embed_fragments(&program, &fragments, &points);

    if points.len() < fragments.len() {
        warn!(
            residues = fragments.len(),
            embedded = points.len(),
            "host has too few function segments; watermark is incomplete"
        );
    }
    debug!(embedded = points.len(), bytes = source.len(), "generated watermarked source");

    Ok(Watermarked {
        source,
        product: encoded.product().clone(),
        residues: fragments.len(),
        embedded: points.len(),
    })
}

/// Recover the embedded signature, requiring one fragment per modulus.
///
/// # Errors
/// - [`WatermarkError::NoFragmentsFound`] if the text carries no fragment.
/// - [`WatermarkError::ResidueCountMismatch`] if fragment indices do not
///   cover exactly `0..moduli.len()`.
pub fn extract_signature(text: &str, moduli: &ModulusSet) -> Result<BigUint, WatermarkError> {
    let found = ExtractedResidues::from_fragments(&extract::extract_fragments(text));
    found.ensure_complete(moduli.len())?;
    let reduced = found.reduced(moduli);
    crt::reconstruct_indexed(reduced.iter().map(|(i, b)| (*i, b)), moduli)
}

/// Check whether `text` carries `claimed` as its watermark.
///
/// Never fails: missing or partial watermarks reconstruct from whatever
/// residues were found and almost certainly yield
/// [`Verdict::NotTheOwner`]. Text without any fragment is always
/// [`Verdict::NotTheOwner`].
pub fn extract_and_verify(text: &str, moduli: &ModulusSet, claimed: &BigUint) -> Verdict {
    let found = ExtractedResidues::from_fragments(&extract::extract_fragments(text));
    match found.ensure_complete(moduli.len()) {
        Ok(()) => {}
        Err(WatermarkError::NoFragmentsFound) => return Verdict::NotTheOwner,
        Err(e) => warn!(%e, "verifying with an incomplete watermark"),
    }

    let reduced = found.reduced(moduli);
    match crt::reconstruct_indexed(reduced.iter().map(|(i, b)| (*i, b)), moduli) {
        Ok(candidate) => Verdict::judge(&candidate, moduli, claimed),
        Err(_) => Verdict::NotTheOwner,
    }
}
