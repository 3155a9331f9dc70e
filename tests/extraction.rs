// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Extraction and verification against hand-written watermarked sources.

use num_bigint::{BigInt, BigUint};
use stegomark_core::watermark::extract::{extract_fragments, ExtractedResidues};
use stegomark_core::{extract_and_verify, extract_signature, ModulusSet, Verdict, WatermarkError};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
}

fn moduli(text: &str) -> ModulusSet {
    ModulusSet::parse(text).unwrap()
}

#[test]
fn legacy_layout_verifies() {
    let text = load_fixture("marked_legacy.py");
    let set = moduli("3,5,7");
    assert_eq!(extract_and_verify(&text, &set, &BigUint::from(50u32)), Verdict::Verified);
    assert_eq!(extract_and_verify(&text, &set, &BigUint::from(51u32)), Verdict::NotTheOwner);
}

#[test]
fn legacy_layout_fragments_in_document_order() {
    let text = load_fixture("marked_legacy.py");
    let found = extract_fragments(&text);
    let residues: Vec<(usize, BigInt)> = found.iter().map(|f| (f.index, f.residue())).collect();
    assert_eq!(
        residues,
        vec![(0, BigInt::from(2)), (1, BigInt::from(0)), (2, BigInt::from(1))]
    );
}

#[test]
fn reordered_fragments_still_pair_with_their_moduli() {
    let text = "W2 = -9\nfor _ in range(10):\n  W2 += 1\nW0 = -13\nfor _ in range(5):\n  W0 += 3\nW1 = -14\nfor _ in range(7):\n  W1 += 2\n";
    let set = moduli("3,5,7");
    assert_eq!(extract_signature(text, &set).unwrap(), BigUint::from(50u32));
}

#[test]
fn missing_fragment_is_a_mismatch() {
    let text = load_fixture("marked_legacy.py");
    let damaged = text.replace("W0 += 3", "W0 -= 3");
    let set = moduli("3,5,7");
    assert_eq!(
        extract_signature(&damaged, &set),
        Err(WatermarkError::ResidueCountMismatch { expected: 3, found: 2 })
    );
    assert_eq!(extract_and_verify(&damaged, &set, &BigUint::from(50u32)), Verdict::NotTheOwner);
}

#[test]
fn surplus_fragment_is_a_mismatch() {
    let text = load_fixture("marked_legacy.py");
    let set = moduli("3,5");
    assert_eq!(
        extract_signature(&text, &set),
        Err(WatermarkError::ResidueCountMismatch { expected: 2, found: 3 })
    );
}

#[test]
fn tampered_literal_changes_the_signature() {
    let text = load_fixture("marked_legacy.py").replace("W2 = -9", "W2 = -8");
    let set = moduli("3,5,7");
    let recovered = extract_signature(&text, &set).unwrap();
    assert_ne!(recovered, BigUint::from(50u32));
    assert_eq!(extract_and_verify(&text, &set, &BigUint::from(50u32)), Verdict::NotTheOwner);
}

#[test]
fn ordinary_loops_are_ignored() {
    let text = "def count(n):\n    total = 0\n    for _ in range(n):\n        total += 1\n    return total\n";
    assert!(extract_fragments(text).is_empty());
    assert_eq!(
        extract_signature(text, &moduli("3,5,7")),
        Err(WatermarkError::NoFragmentsFound)
    );
    assert_eq!(extract_and_verify(text, &moduli("3,5,7"), &BigUint::from(0u32)), Verdict::NotTheOwner);
}

#[test]
fn residues_collapse_duplicates() {
    let text = load_fixture("marked_legacy.py");
    let doubled = format!("{text}\n{text}");
    let found = ExtractedResidues::from_fragments(&extract_fragments(&doubled));
    assert_eq!(found.len(), 3);
    assert!(found.ensure_complete(3).is_ok());
}
