// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Chinese Remainder Theorem encoding and reconstruction of signatures.
//!
//! Encoding splits a signature `s` into residues `b_i = s mod p_i`.
//! Reconstruction inverts this with
//!
//! ```text
//! s = Σ b_i · R_i · x_i  (mod N),   R_i = N / p_i,   x_i = R_i⁻¹ mod p_i
//! ```
//!
//! which is unique modulo `N = ∏ p_i` because the moduli are pairwise coprime.

use core::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use tracing::debug;

use crate::watermark::error::WatermarkError;
use crate::watermark::moduli::ModulusSet;

/// CRT residues of a signature, positionally paired with the modulus set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueVector {
    residues: Vec<BigUint>,
    product: BigUint,
}

impl ResidueVector {
    /// Residue `i` is `signature mod p_i`.
    pub fn residues(&self) -> &[BigUint] {
        &self.residues
    }

    /// Product of the moduli the residues were computed against.
    pub fn product(&self) -> &BigUint {
        &self.product
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

/// Split `signature` into its residues modulo each entry of `moduli`.
///
/// # Errors
/// Returns [`WatermarkError::InsufficientModulus`] if `∏ p_i <= signature`;
/// no residues are produced in that case.
pub fn encode_signature(
    signature: &BigUint,
    moduli: &ModulusSet,
) -> Result<ResidueVector, WatermarkError> {
    let product = moduli.product();
    if product <= signature {
        return Err(WatermarkError::InsufficientModulus { product: product.clone() });
    }
    let residues: Vec<BigUint> = moduli.as_slice().iter().map(|p| signature % p).collect();
    debug!(residues = residues.len(), %product, "encoded signature");
    Ok(ResidueVector { residues, product: product.clone() })
}

/// Multiplicative inverse of `a` modulo `m` via the extended Euclidean
/// algorithm, or `None` if `gcd(a, m) != 1`.
///
/// Modulo 1 every value is congruent to 0, which is returned as the inverse.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let modulus = BigInt::from(m.clone());
    let (mut t, mut new_t) = (BigInt::zero(), BigInt::one());
    let (mut r, mut new_r) = (modulus.clone(), BigInt::from(a % m));

    while !new_r.is_zero() {
        let quotient = &r / &new_r;

        let next_t = &t - &quotient * &new_t;
        t = core::mem::replace(&mut new_t, next_t);

        let next_r = &r - &quotient * &new_r;
        r = core::mem::replace(&mut new_r, next_r);
    }

    if !r.is_one() {
        return None;
    }
    if t.is_negative() {
        t += &modulus;
    }
    t.to_biguint()
}

/// Reconstruct the signature candidate from residues in modulus order.
///
/// A residue vector shorter than the modulus set is accepted; the missing
/// residues contribute nothing and the result is almost certainly not the
/// embedded signature. Residues beyond the modulus count are ignored.
pub fn reconstruct(residues: &[BigUint], moduli: &ModulusSet) -> Result<BigUint, WatermarkError> {
    reconstruct_indexed(residues.iter().enumerate(), moduli)
}

/// Reconstruct from `(modulus index, residue)` pairs.
///
/// Pairs whose index has no modulus are skipped.
pub(crate) fn reconstruct_indexed<'a, I>(
    residues: I,
    moduli: &ModulusSet,
) -> Result<BigUint, WatermarkError>
where
    I: IntoIterator<Item = (usize, &'a BigUint)>,
{
    let n = moduli.product();
    let mut candidate = BigUint::zero();
    let mut used = 0usize;

    for (i, b) in residues {
        let Some(p) = moduli.as_slice().get(i) else {
            continue;
        };
        let r_i = n / p;
        let x_i = mod_inverse(&r_i, p).ok_or_else(|| WatermarkError::NonCoprimeModuli {
            first: p.clone(),
            second: r_i.clone(),
        })?;
        candidate = (candidate + b * &r_i * x_i) % n;
        used += 1;
    }

    debug!(used, moduli = moduli.len(), "reconstructed signature candidate");
    Ok(candidate)
}

/// Outcome of checking a reconstructed signature against a claimed owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The reconstructed signature equals the claimed one.
    Verified,
    /// Mismatch, including text that carries no watermark at all.
    NotTheOwner,
}

impl Verdict {
    /// Compare `candidate mod N` with `claimed`.
    pub fn judge(candidate: &BigUint, moduli: &ModulusSet, claimed: &BigUint) -> Self {
        if &(candidate % moduli.product()) == claimed {
            Self::Verified
        } else {
            Self::NotTheOwner
        }
    }

    pub fn is_verified(self) -> bool {
        self == Self::Verified
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "Verified"),
            Self::NotTheOwner => write!(f, "Not the owner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn moduli(text: &str) -> ModulusSet {
        ModulusSet::parse(text).unwrap()
    }

    #[test]
    fn encodes_known_residues() {
        let encoded = encode_signature(&big(50), &moduli("3,5,7")).unwrap();
        assert_eq!(encoded.residues(), &[big(2), big(0), big(1)]);
        assert_eq!(encoded.product(), &big(105));
    }

    #[test]
    fn reconstructs_known_residues() {
        let s = reconstruct(&[big(2), big(0), big(1)], &moduli("3,5,7")).unwrap();
        assert_eq!(s, big(50));
    }

    #[test]
    fn zero_signature_is_all_zero() {
        let set = moduli("11,13,17,19");
        let encoded = encode_signature(&big(0), &set).unwrap();
        assert!(encoded.residues().iter().all(Zero::is_zero));
        assert_eq!(reconstruct(encoded.residues(), &set).unwrap(), big(0));
    }

    #[test]
    fn capacity_is_exclusive() {
        let set = moduli("3,5,7");
        assert!(encode_signature(&big(104), &set).is_ok());
        match encode_signature(&big(105), &set) {
            Err(WatermarkError::InsufficientModulus { product }) => assert_eq!(product, big(105)),
            other => panic!("expected InsufficientModulus, got {other:?}"),
        }
        assert!(encode_signature(&big(10_000), &set).is_err());
    }

    #[test]
    fn inverse_basics() {
        assert_eq!(mod_inverse(&big(35), &big(3)), Some(big(2)));
        assert_eq!(mod_inverse(&big(21), &big(5)), Some(big(1)));
        assert_eq!(mod_inverse(&big(15), &big(7)), Some(big(1)));
        assert_eq!(mod_inverse(&big(3), &big(1)), Some(big(0)));
        assert_eq!(mod_inverse(&big(6), &big(9)), None);
        assert_eq!(mod_inverse(&big(4), &big(0)), None);
    }

    #[test]
    fn short_residue_vector_does_not_verify() {
        let set = moduli("3,5,7");
        let candidate = reconstruct(&[big(2), big(0)], &set).unwrap();
        assert_eq!(Verdict::judge(&candidate, &set, &big(50)), Verdict::NotTheOwner);
    }

    #[test]
    fn extra_residues_are_ignored() {
        let set = moduli("3,5,7");
        let s = reconstruct(&[big(2), big(0), big(1), big(4)], &set).unwrap();
        assert_eq!(s, big(50));
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Verified.to_string(), "Verified");
        assert_eq!(Verdict::NotTheOwner.to_string(), "Not the owner");
        assert!(Verdict::Verified.is_verified());
        assert!(!Verdict::NotTheOwner.is_verified());
    }

    #[test]
    fn judge_reduces_candidate() {
        let set = moduli("3,5,7");
        assert!(Verdict::judge(&big(155), &set, &big(50)).is_verified());
        assert!(!Verdict::judge(&big(50), &set, &big(51)).is_verified());
    }

    #[test]
    fn roundtrip_beyond_u64() {
        let set = moduli("18446744073709551557,18446744073709551533,4294967291");
        let signature = set.product() - big(1);
        let encoded = encode_signature(&signature, &set).unwrap();
        assert_eq!(reconstruct(encoded.residues(), &set).unwrap(), signature);
    }

    const PRIMES: [u64; 10] = [2, 3, 5, 7, 11, 13, 101, 7919, 65_537, 1_000_003];

    proptest! {
        #[test]
        fn crt_roundtrip(
            chosen in proptest::sample::subsequence(PRIMES.to_vec(), 1..=PRIMES.len()),
            raw in any::<u128>(),
        ) {
            let set = ModulusSet::new(chosen.into_iter().map(BigUint::from).collect()).unwrap();
            let signature = BigUint::from(raw) % set.product();
            let encoded = encode_signature(&signature, &set).unwrap();
            prop_assert_eq!(reconstruct(encoded.residues(), &set).unwrap(), signature);
        }
    }
}
