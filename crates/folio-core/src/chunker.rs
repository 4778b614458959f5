//! Split generated feedback into platform-sized message segments.

use serde::{Deserialize, Serialize};

/// Longest message the chat platform accepts, in characters.
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// Room a `**(Part N)**` label needs on top of a segment, up to part 9999.
pub const LABEL_RESERVE: usize = 16;

/// Character budgets for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChunkLimits {
    /// Texts up to this many characters go out as one message.
    #[serde(default = "default_single_message")]
    pub single_message: usize,
    /// Slice width used once a text exceeds `single_message`.
    #[serde(default = "default_stride")]
    pub stride: usize,
}

fn default_single_message() -> usize {
    MESSAGE_CHAR_LIMIT
}

fn default_stride() -> usize {
    1900
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            single_message: default_single_message(),
            stride: default_stride(),
        }
    }
}

/// Split `text` into ordered segments by character count.
///
/// Splits ignore word boundaries; concatenating the result reproduces `text`.
/// A zero `stride` is treated as 1.
#[must_use]
pub fn chunk(text: &str, limits: ChunkLimits) -> Vec<&str> {
    if text.chars().count() <= limits.single_message {
        return vec![text];
    }

    let stride = limits.stride.max(1);
    let mut segments = Vec::new();
    let mut start = 0;
    let mut taken = 0;

    for (idx, _) in text.char_indices() {
        if taken == stride {
            segments.push(&text[start..idx]);
            start = idx;
            taken = 0;
        }
        taken += 1;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Prefix each segment with `**(Part N)**` when there is more than one.
#[must_use]
pub fn label_segments(segments: &[&str]) -> Vec<String> {
    if segments.len() <= 1 {
        return segments.iter().map(|s| (*s).to_owned()).collect();
    }
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| format!("**(Part {})**\n{s}", i + 1))
        .collect()
}
