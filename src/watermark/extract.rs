// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Fragment extraction from watermarked text.
//!
//! The text is tokenized (whitespace and line structure are discarded) and
//! scanned left to right for the fixed token shape of a stego fragment:
//!
//! ```text
//! W<i> = [-]<init> for _ in range ( <k> ) : W<i> += [-]<r>
//! ```
//!
//! Matches never overlap. The host program is never executed; the residue is
//! recomputed as `init + k*r` from the literals.

use core::iter::Peekable;
use core::ops::Range;
use core::str::{CharIndices, FromStr};
use std::collections::BTreeMap;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use tracing::debug;

use crate::watermark::error::WatermarkError;
use crate::watermark::moduli::ModulusSet;
use crate::watermark::VARIABLE_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Ident,
    Int,
    Minus,
    Assign,
    PlusAssign,
    LParen,
    RParen,
    Colon,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: Kind,
    text: &'a str,
    start: usize,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

fn skip_while(chars: &mut Peekable<CharIndices<'_>>, pred: impl Fn(char) -> bool) {
    while chars.next_if(|&(_, c)| pred(c)).is_some() {}
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            c if c.is_alphabetic() || c == '_' => {
                skip_while(&mut chars, |c| c.is_alphanumeric() || c == '_');
                Kind::Ident
            }
            c if c.is_ascii_digit() => {
                skip_while(&mut chars, |c| c.is_ascii_digit());
                Kind::Int
            }
            '-' => Kind::Minus,
            '+' if chars.next_if(|&(_, c)| c == '=').is_some() => Kind::PlusAssign,
            // `==` is a comparison, not an assignment.
            '=' if chars.next_if(|&(_, c)| c == '=').is_some() => Kind::Other,
            '=' => Kind::Assign,
            '(' => Kind::LParen,
            ')' => Kind::RParen,
            ':' => Kind::Colon,
            _ => Kind::Other,
        };
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        tokens.push(Token { kind, text: &text[start..end], start });
    }
    tokens
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'a> Cursor<'_, 'a> {
    fn take(&mut self, kind: Kind) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).filter(|t| t.kind == kind)?;
        self.pos += 1;
        Some(token.text)
    }

    fn keyword(&mut self, word: &str) -> Option<()> {
        (self.take(Kind::Ident)? == word).then_some(())
    }

    fn int(&mut self) -> Option<BigInt> {
        BigInt::from_str(self.take(Kind::Int)?).ok()
    }

    fn signed_int(&mut self) -> Option<BigInt> {
        let negative = self.take(Kind::Minus).is_some();
        let value = self.int()?;
        Some(if negative { -value } else { value })
    }
}

/// Residue index encoded in a fragment variable name (`W12` -> 12).
fn fragment_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(VARIABLE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A fragment located in watermarked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFragment {
    /// Residue index from the variable name.
    pub index: usize,
    pub initial_value: BigInt,
    pub iterations: BigInt,
    pub step: BigInt,
    /// Byte range of the fragment in the scanned text.
    pub span: Range<usize>,
}

impl ExtractedFragment {
    /// The value the fragment computes: `init + k*r`.
    pub fn residue(&self) -> BigInt {
        &self.initial_value + &self.iterations * &self.step
    }
}

fn match_fragment(tokens: &[Token<'_>], start: usize) -> Option<(ExtractedFragment, usize)> {
    let mut cur = Cursor { tokens, pos: start };

    let name = cur.take(Kind::Ident)?;
    let index = fragment_index(name)?;
    cur.take(Kind::Assign)?;
    let initial_value = cur.signed_int()?;

    cur.keyword("for")?;
    cur.keyword("_")?;
    cur.keyword("in")?;
    cur.keyword("range")?;
    cur.take(Kind::LParen)?;
    let iterations = cur.int()?;
    cur.take(Kind::RParen)?;
    cur.take(Kind::Colon)?;

    cur.keyword(name)?;
    cur.take(Kind::PlusAssign)?;
    let step = cur.signed_int()?;

    let span = tokens[start].start..tokens[cur.pos - 1].end();
    Some((ExtractedFragment { index, initial_value, iterations, step, span }, cur.pos))
}

/// All non-overlapping fragments in `text`, in document order.
pub fn extract_fragments(text: &str) -> Vec<ExtractedFragment> {
    let tokens = tokenize(text);
    let mut found = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        match match_fragment(&tokens, pos) {
            Some((fragment, next)) => {
                found.push(fragment);
                pos = next;
            }
            None => pos += 1,
        }
    }
    debug!(fragments = found.len(), tokens = tokens.len(), "scanned for fragments");
    found
}

/// Recovered residues keyed by their fragment index.
///
/// When several fragments carry the same index, the first in document order
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedResidues {
    by_index: BTreeMap<usize, BigInt>,
}

impl ExtractedResidues {
    pub fn from_fragments(fragments: &[ExtractedFragment]) -> Self {
        let mut by_index = BTreeMap::new();
        for fragment in fragments {
            by_index.entry(fragment.index).or_insert_with(|| fragment.residue());
        }
        Self { by_index }
    }

    /// Number of distinct residue indices found.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Residue for modulus `index`, if a fragment carried it.
    pub fn get(&self, index: usize) -> Option<&BigInt> {
        self.by_index.get(&index)
    }

    /// Check that exactly the indices `0..expected` were recovered.
    ///
    /// # Errors
    /// - [`WatermarkError::NoFragmentsFound`] if nothing was recovered.
    /// - [`WatermarkError::ResidueCountMismatch`] for missing or surplus indices.
    pub fn ensure_complete(&self, expected: usize) -> Result<(), WatermarkError> {
        if self.by_index.is_empty() {
            return Err(WatermarkError::NoFragmentsFound);
        }
        let contiguous = self.by_index.keys().enumerate().all(|(pos, &i)| pos == i);
        if self.by_index.len() != expected || !contiguous {
            return Err(WatermarkError::ResidueCountMismatch {
                expected,
                found: self.by_index.len(),
            });
        }
        Ok(())
    }

    /// `(index, residue mod p_index)` for every recovered index that has a
    /// modulus, in index order.
    pub fn reduced(&self, moduli: &ModulusSet) -> Vec<(usize, BigUint)> {
        self.by_index
            .iter()
            .filter_map(|(&i, value)| {
                let p = BigInt::from(moduli.as_slice().get(i)?.clone());
                Some((i, value.mod_floor(&p).magnitude().clone()))
            })
            .collect()
    }
}
