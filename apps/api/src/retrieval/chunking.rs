//! Recursive character splitter for the full-document retrieval index.
//!
//! Splits on paragraph breaks first, then line breaks, then spaces, then single
//! characters, and merges the pieces back into windows of at most `chunk_size`
//! characters that overlap by up to `overlap` characters.

use std::collections::VecDeque;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    split_with(text, &SEPARATORS, chunk_size.max(1), overlap)
}

fn split_with(text: &str, separators: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    let position = separators
        .iter()
        .position(|s| s.is_empty() || text.contains(s))
        .unwrap_or(separators.len().saturating_sub(1));
    let separator = separators.get(position).copied().unwrap_or("");
    let finer = separators.get(position + 1..).unwrap_or(&[]);

    let pieces: Vec<&str> = if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|p| !p.is_empty()).collect()
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for piece in pieces {
        if char_len(piece) <= chunk_size {
            pending.push(piece);
            continue;
        }

        if !pending.is_empty() {
            chunks.extend(merge(&pending, separator, chunk_size, overlap));
            pending.clear();
        }

        if finer.is_empty() {
            chunks.push(piece.to_string());
        } else {
            chunks.extend(split_with(piece, finer, chunk_size, overlap));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge(&pending, separator, chunk_size, overlap));
    }

    chunks
}

/// Greedily packs pieces into windows, carrying up to `overlap` characters of
/// trailing pieces into the next window.
fn merge(pieces: &[&str], separator: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut out = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);
        let join_cost = if window.is_empty() { 0 } else { separator_len };

        if total + join_cost + len > chunk_size && !window.is_empty() {
            push_joined(&mut out, &window, separator);

            while total > overlap
                || (total > 0
                    && total + len + if window.is_empty() { 0 } else { separator_len } > chunk_size)
            {
                let Some(removed) = window.pop_front() else {
                    break;
                };
                let removed_join = if window.is_empty() { 0 } else { separator_len };
                total -= char_len(removed) + removed_join;
            }
        }

        total += len + if window.is_empty() { 0 } else { separator_len };
        window.push_back(piece);
    }

    if !window.is_empty() {
        push_joined(&mut out, &window, separator);
    }

    out
}

fn push_joined(out: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
