//! Turns candidate boundaries into sized chunks.
//!
//! Sizes are measured in characters; offsets are bytes. Oversized
//! spans are cut at character boundaries via `char_indices()` so
//! multi-byte text never splits inside a code point.

use crate::core::types::Chunk;
use std::collections::BTreeSet;

/// Assemble chunks from `text` and its candidate boundaries.
///
/// First pass, left to right over boundary pairs:
/// - spans longer than `2 * target_size` are cut into `target_size` pieces
/// - spans shorter than `target_size / 2` absorb the following span
/// - everything else is kept as-is
///
/// If `max_chunks` is set and the first pass produced more chunks,
/// consecutive chunks are glued into buckets of roughly
/// `len / max_chunks` characters. This drops the semantic alignment of
/// the first pass but keeps the split lossless.
///
/// Boundaries outside the text or not on a character boundary are
/// ignored; `0` and `text.len()` are always implied.
pub fn assemble(
    text: &str,
    boundaries: &[usize],
    target_size: usize,
    max_chunks: Option<usize>,
) -> Vec<Chunk> {
    let target = target_size.max(1);
    let boundaries = sanitize(text, boundaries);

    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(boundaries.len());
    let mut i = 0;
    while i + 1 < boundaries.len() {
        let (start, end) = (boundaries[i], boundaries[i + 1]);
        let len = text[start..end].chars().count();

        if len > target * 2 {
            spans.extend(split_fixed(text, start, end, target));
            i += 1;
        } else if len * 2 < target && i + 2 < boundaries.len() {
            spans.push((start, boundaries[i + 2]));
            i += 2;
        } else {
            spans.push((start, end));
            i += 1;
        }
    }

    if let Some(max) = max_chunks {
        let max = max.max(1);
        if spans.len() > max {
            tracing::debug!(
                "Capping {} chunks to {} with size buckets",
                spans.len(),
                max
            );
            spans = bucket(text, &spans, max);
        }
    }

    let chunks: Vec<Chunk> = spans
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| Chunk::from_source(index, text, start, end))
        .collect();

    debug_assert_eq!(
        chunks.iter().map(|c| c.content.as_str()).collect::<String>(),
        text,
        "chunks must reconstruct the source text"
    );

    chunks
}

fn sanitize(text: &str, boundaries: &[usize]) -> Vec<usize> {
    let mut set: BTreeSet<usize> = boundaries
        .iter()
        .copied()
        .filter(|&b| b <= text.len() && text.is_char_boundary(b))
        .collect();
    set.insert(0);
    set.insert(text.len());
    set.into_iter().collect()
}

/// Cut `text[start..end]` into pieces of `size` characters
fn split_fixed(text: &str, start: usize, end: usize, size: usize) -> Vec<(usize, usize)> {
    let mut cuts: Vec<usize> = text[start..end]
        .char_indices()
        .step_by(size)
        .map(|(offset, _)| start + offset)
        .collect();
    cuts.push(end);
    cuts.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Glue consecutive spans into at most `max` buckets.
///
/// A span joins bucket `pos / bucket_size`, where `pos` is its starting
/// character position. Positions are below `bucket_size * max`, so no
/// more than `max` buckets can exist.
fn bucket(text: &str, spans: &[(usize, usize)], max: usize) -> Vec<(usize, usize)> {
    let total = text.chars().count();
    let bucket_size = total.div_ceil(max).max(1);

    let mut buckets: Vec<(usize, usize, usize)> = Vec::with_capacity(max);
    let mut pos = 0;
    for &(start, end) in spans {
        let id = pos / bucket_size;
        match buckets.last_mut() {
            Some((last_id, _, last_end)) if *last_id == id => *last_end = end,
            _ => buckets.push((id, start, end)),
        }
        pos += text[start..end].chars().count();
    }

    buckets.into_iter().map(|(_, start, end)| (start, end)).collect()
}
