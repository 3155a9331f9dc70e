// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Host program segmentation and insertion point selection.
//!
//! The host text is split into lines and partitioned at every function
//! definition header, giving `m + 1` segments for `m` headers (the text
//! before the first header is its own, possibly empty, leading segment).
//! Segment `i` receives fragment `i`.
//!
//! Within a segment a line is a safe splice point when it does not open a
//! block and its indentation is at most [`MAX_INSERT_INDENT`]. Blank and
//! comment-only lines carry no indentation of their own, so they are judged
//! by the next code line below them in the segment.

use core::ops::Range;

use rand::Rng;
use tracing::debug;

use crate::watermark::{BLOCK_OPENER, COMMENT_PREFIX, HEADER_KEYWORD, MAX_INSERT_INDENT};

/// Host source viewed as an ordered sequence of lines.
#[derive(Debug, Clone)]
pub struct HostProgram<'a> {
    lines: Vec<&'a str>,
}

impl<'a> HostProgram<'a> {
    /// Split on `\n`. Joining [`lines`](Self::lines) with `\n` restores `text`.
    pub fn parse(text: &'a str) -> Self {
        Self { lines: text.split('\n').collect() }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Partition the lines at function headers.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (i, line) in self.lines.iter().enumerate() {
            if is_function_header(line) {
                segments.push(Segment { index: segments.len(), lines: start..i });
                start = i;
            }
        }
        segments.push(Segment { index: segments.len(), lines: start..self.lines.len() });
        segments
    }
}

/// A contiguous run of host lines bounded by function headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position of the segment in the file; fragment `index` lands here.
    pub index: usize,
    /// Absolute host line range.
    pub lines: Range<usize>,
}

/// Where a fragment is spliced: immediately before host line `line`.
///
/// `line == segment.lines.end` means the fragment is appended at the end of
/// the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub segment: usize,
    pub line: usize,
    pub indent: usize,
}

/// `true` for a column-0 function header: keyword, whitespace, identifier,
/// optional whitespace, then `(`.
pub fn is_function_header(line: &str) -> bool {
    let Some(rest) = line.strip_prefix(HEADER_KEYWORD) else {
        return false;
    };
    let name = rest.trim_start();
    if name.len() == rest.len() {
        return false;
    }
    let name_len = name
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(name.len());
    name_len > 0 && name[name_len..].trim_start().starts_with('(')
}

/// Number of leading whitespace characters.
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn is_block_opening(line: &str) -> bool {
    line.trim_end().ends_with(BLOCK_OPENER)
}

fn is_code(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with(COMMENT_PREFIX)
}

/// Indentation of each line in `lines`, with blank and comment-only lines
/// taking the indentation of the next code line (0 if there is none).
fn effective_indentation(lines: &[&str]) -> Vec<usize> {
    let mut result = vec![0; lines.len()];
    let mut below = 0;
    for (i, line) in lines.iter().enumerate().rev() {
        if is_code(line) {
            below = indentation(line);
        }
        result[i] = below;
    }
    result
}

/// Safe splice points of `segment` as `(absolute line, indentation)` pairs.
pub fn candidate_lines(host: &HostProgram<'_>, segment: &Segment) -> Vec<(usize, usize)> {
    let lines = &host.lines()[segment.lines.clone()];
    effective_indentation(lines)
        .into_iter()
        .zip(lines)
        .enumerate()
        .filter(|(_, (indent, line))| *indent <= MAX_INSERT_INDENT && !is_block_opening(line))
        .map(|(offset, (indent, _))| (segment.lines.start + offset, indent))
        .collect()
}

/// Pick one insertion point uniformly among the segment's candidates, or
/// the end of the segment if it has none.
pub fn choose_insertion_point<R: Rng + ?Sized>(
    host: &HostProgram<'_>,
    segment: &Segment,
    rng: &mut R,
) -> InsertionPoint {
    let candidates = candidate_lines(host, segment);
    let (line, indent) = if candidates.is_empty() {
        (segment.lines.end, 0)
    } else {
        // u32 range keeps seeded choices identical on 32- and 64-bit targets.
        candidates[rng.gen_range(0..candidates.len() as u32) as usize]
    };
    InsertionPoint { segment: segment.index, line, indent }
}

/// Plan one insertion point for each of the first `count` segments.
///
/// Returns fewer than `count` points when the host has fewer segments.
pub fn plan_insertions<R: Rng + ?Sized>(
    host: &HostProgram<'_>,
    count: usize,
    rng: &mut R,
) -> Vec<InsertionPoint> {
    host.segments()
        .iter()
        .take(count)
        .map(|segment| {
            let point = choose_insertion_point(host, segment, rng);
            debug!(segment = point.segment, line = point.line, indent = point.indent, "planned insertion");
            point
        })
        .collect()
}
