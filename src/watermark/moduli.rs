// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Modulus set and signature input parsing.
//!
//! A [`ModulusSet`] is the shared configuration of the encode and decode
//! paths: the same values, in the same order, must be supplied to both.
//! Pairwise coprimality is checked when the set is built, so every
//! downstream CRT step can rely on the modular inverses existing.

use core::str::FromStr;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::watermark::error::WatermarkError;

/// Ordered, pairwise-coprime moduli `p_0..p_{n-1}` and their product `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulusSet {
    moduli: Vec<BigUint>,
    product: BigUint,
}

impl ModulusSet {
    /// Build a modulus set, validating that it is non-empty, every modulus is
    /// positive, and all pairs are coprime.
    ///
    /// # Errors
    /// - [`WatermarkError::MalformedModuli`] if the list is empty or contains zero.
    /// - [`WatermarkError::NonCoprimeModuli`] for the first pair sharing a factor.
    pub fn new(moduli: Vec<BigUint>) -> Result<Self, WatermarkError> {
        if moduli.is_empty() {
            return Err(WatermarkError::MalformedModuli(
                "at least one modulus is required".into(),
            ));
        }
        if moduli.iter().any(Zero::is_zero) {
            return Err(WatermarkError::MalformedModuli(
                "moduli must be positive".into(),
            ));
        }
        for (i, first) in moduli.iter().enumerate() {
            for second in &moduli[i + 1..] {
                if !first.gcd(second).is_one() {
                    return Err(WatermarkError::NonCoprimeModuli {
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
        let product = moduli.iter().product();
        Ok(Self { moduli, product })
    }

    /// Parse a comma-separated list such as `"3, 5, 7"`.
    ///
    /// Whitespace around each entry is ignored; empty entries are rejected.
    pub fn parse(text: &str) -> Result<Self, WatermarkError> {
        let moduli = text
            .split(',')
            .map(|token| parse_modulus(token.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(moduli)
    }

    /// The moduli in configuration order.
    pub fn as_slice(&self) -> &[BigUint] {
        &self.moduli
    }

    /// Number of moduli (and therefore residues / fragments).
    pub fn len(&self) -> usize {
        self.moduli.len()
    }

    /// Always `false`: a constructed set holds at least one modulus.
    pub fn is_empty(&self) -> bool {
        self.moduli.is_empty()
    }

    /// `N = ∏ p_i`, the exclusive upper bound on encodable signatures.
    pub fn product(&self) -> &BigUint {
        &self.product
    }
}

impl FromStr for ModulusSet {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_modulus(token: &str) -> Result<BigUint, WatermarkError> {
    if token.is_empty() {
        return Err(WatermarkError::MalformedModuli("empty entry".into()));
    }
    BigUint::from_str(token).map_err(|_| {
        WatermarkError::MalformedModuli(format!("'{token}' is not a positive integer"))
    })
}

/// Parse user-entered signature text as a non-negative integer.
pub fn parse_signature(text: &str) -> Result<BigUint, WatermarkError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WatermarkError::MalformedSignature("signature is empty".into()));
    }
    BigUint::from_str(trimmed).map_err(|_| {
        WatermarkError::MalformedSignature(format!(
            "'{trimmed}' is not a non-negative integer"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn parses_with_whitespace() {
        let set = ModulusSet::parse(" 3,5 , 7 ").unwrap();
        assert_eq!(set.as_slice(), &[big(3), big(5), big(7)]);
        assert_eq!(set.product(), &big(105));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn single_modulus() {
        let set: ModulusSet = "1000003".parse().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.product(), &big(1_000_003));
    }

    #[test]
    fn rejects_garbage_entries() {
        for text in ["", "3,,5", "3,five", "3,-5", "3.5,7"] {
            match ModulusSet::parse(text) {
                Err(WatermarkError::MalformedModuli(_)) => {}
                other => panic!("expected MalformedModuli for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_zero() {
        assert!(matches!(
            ModulusSet::parse("3,0,7"),
            Err(WatermarkError::MalformedModuli(_))
        ));
    }

    #[test]
    fn rejects_non_coprime_pair() {
        match ModulusSet::parse("6,5,9") {
            Err(WatermarkError::NonCoprimeModuli { first, second }) => {
                assert_eq!(first, big(6));
                assert_eq!(second, big(9));
            }
            other => panic!("expected NonCoprimeModuli, got {other:?}"),
        }
    }

    #[test]
    fn composite_but_coprime_is_accepted() {
        let set = ModulusSet::parse("8,9,25").unwrap();
        assert_eq!(set.product(), &big(1800));
    }

    #[test]
    fn large_moduli() {
        let set = ModulusSet::parse("18446744073709551557,18446744073709551533").unwrap();
        assert!(set.product() > &big(u64::MAX));
    }

    #[test]
    fn signature_parsing() {
        assert_eq!(parse_signature(" 50 ").unwrap(), big(50));
        assert_eq!(parse_signature("0").unwrap(), big(0));
        assert!(matches!(parse_signature("-1"), Err(WatermarkError::MalformedSignature(_))));
        assert!(matches!(parse_signature(""), Err(WatermarkError::MalformedSignature(_))));
        assert!(matches!(parse_signature("12ab"), Err(WatermarkError::MalformedSignature(_))));
    }
}
