//! UTF-16 helpers for host buffers, which count surrogate pairs as two units.

pub const HIGH_SURROGATE_START: u16 = 0xD800;
pub const LOW_SURROGATE_START: u16 = 0xDC00;

pub fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combine a high and a low surrogate into one scalar value.
///
/// Callers must have checked both halves with `is_high_surrogate` /
/// `is_low_surrogate`.
pub fn combine_surrogates(high: u16, low: u16) -> u32 {
    0x10000
        + (u32::from(high - HIGH_SURROGATE_START) << 10)
        + u32::from(low - LOW_SURROGATE_START)
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a character (code point) index into a UTF-16 offset.
///
/// Indices past the end clamp to the full length.
pub fn char_index_to_utf16(s: &str, char_index: usize) -> usize {
    s.chars().take(char_index).map(char::len_utf16).sum()
}

/// Last UTF-16 unit of `s`, or 0 for an empty string.
pub fn last_utf16_unit(s: &str) -> u16 {
    s.encode_utf16().last().unwrap_or(0)
}
