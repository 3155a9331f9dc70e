// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Splicing fragments into the host text.

use crate::watermark::fragment::StegoFragment;
use crate::watermark::planner::{HostProgram, InsertionPoint};

/// Splice each fragment immediately before its planned line.
///
/// Fragment `i` is paired with the insertion point of segment `i`; fragments
/// without a planned point are not embedded. Fragment lines are prefixed with
/// one column less than the insertion line's indentation. Host lines are
/// emitted unchanged and in order, so deleting the fragment lines restores
/// the input exactly. Hosts with CRLF line endings get CRLF fragment lines.
pub fn embed_fragments(
    host: &HostProgram<'_>,
    fragments: &[StegoFragment],
    points: &[InsertionPoint],
) -> String {
    let lines = host.lines();
    let crlf = lines.first().is_some_and(|l| l.ends_with('\r'));

    let mut placements: Vec<(&InsertionPoint, &StegoFragment)> = points
        .iter()
        .filter_map(|p| fragments.iter().find(|f| f.index() == p.segment).map(|f| (p, f)))
        .collect();
    placements.sort_by_key(|(p, _)| (p.line, p.segment));
    let mut pending = placements.into_iter().peekable();

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 3 * fragments.len());
    for line_no in 0..=lines.len() {
        while let Some((point, fragment)) = pending.next_if(|(p, _)| p.line == line_no) {
            let prefix = " ".repeat(point.indent.saturating_sub(1));
            let suffix = if crlf { "\r" } else { "" };
            out.extend(fragment.lines().into_iter().map(|l| format!("{prefix}{l}{suffix}")));
        }
        if let Some(line) = lines.get(line_no) {
            out.push((*line).to_string());
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn frag(index: usize, residue: u32) -> StegoFragment {
        StegoFragment::with_shape(index, &BigUint::from(residue), 5, 2)
    }

    #[test]
    fn splices_before_planned_lines() {
        let host = HostProgram::parse("a = 1\n\ndef f():\n    pass\n");
        let points = [
            InsertionPoint { segment: 0, line: 1, indent: 0 },
            InsertionPoint { segment: 1, line: 4, indent: 0 },
        ];
        let out = embed_fragments(&host, &[frag(0, 2), frag(1, 3)], &points);
        assert_eq!(
            out,
            "a = 1\nW0 = -8\nfor _ in range(5):\n  W0 += 2\n\ndef f():\n    pass\nW1 = -7\nfor _ in range(5):\n  W1 += 2\n"
        );
    }

    #[test]
    fn indents_one_column_shallower() {
        let host = HostProgram::parse("x\n  y");
        let points = [InsertionPoint { segment: 0, line: 1, indent: 3 }];
        let out = embed_fragments(&host, &[frag(0, 1)], &points);
        assert_eq!(out, "x\n  W0 = -9\n  for _ in range(5):\n    W0 += 2\n  y");
    }

    #[test]
    fn appends_at_end_of_text() {
        let host = HostProgram::parse("def f():\n    pass");
        let points = [InsertionPoint { segment: 0, line: 0, indent: 0 }, InsertionPoint { segment: 1, line: 2, indent: 0 }];
        let out = embed_fragments(&host, &[frag(0, 0), frag(1, 0)], &points);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "W0 = -10");
        assert_eq!(lines[3], "def f():");
        assert_eq!(lines[5], "W1 = -10");
    }

    #[test]
    fn unplanned_fragments_are_dropped() {
        let host = HostProgram::parse("x = 1");
        let points = [InsertionPoint { segment: 0, line: 0, indent: 0 }];
        let out = embed_fragments(&host, &[frag(0, 4), frag(1, 4), frag(2, 4)], &points);
        assert_eq!(out.matches("range(").count(), 1);
        assert!(out.ends_with("x = 1"));
    }

    #[test]
    fn host_text_survives_fragment_removal() {
        let text = "import sys\n\ndef main():\n    print(sys.argv)\n\nmain()\n";
        let host = HostProgram::parse(text);
        let points = [
            InsertionPoint { segment: 0, line: 1, indent: 0 },
            InsertionPoint { segment: 1, line: 5, indent: 0 },
        ];
        let out = embed_fragments(&host, &[frag(0, 6), frag(1, 9)], &points);
        let stripped: Vec<&str> = out
            .split('\n')
            .filter(|l| !l.trim_start().starts_with('W') && !l.starts_with("for _ in range("))
            .collect();
        assert_eq!(stripped.join("\n"), text);
    }

    #[test]
    fn crlf_hosts_get_crlf_fragments() {
        let host = HostProgram::parse("x = 1\r\ny = 2\r\n");
        let points = [InsertionPoint { segment: 0, line: 1, indent: 0 }];
        let out = embed_fragments(&host, &[frag(0, 1)], &points);
        assert_eq!(out, "x = 1\r\nW0 = -9\r\nfor _ in range(5):\r\n  W0 += 2\r\ny = 2\r\n");
    }
}
