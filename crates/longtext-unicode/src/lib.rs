// this_file: crates/longtext-unicode/src/lib.rs

//! Script classification and width units shared across every tier.
//!
//! Classification is an explicit table of code-point ranges, queried per code
//! point. A line is wide-script as soon as one of its code points falls in a
//! Han, Hiragana or Katakana range, even if everything else is Latin.

use std::cmp::Ordering;

/// Scripts that switch a line to width-accumulation wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WideScript {
    Han,
    Hiragana,
    Katakana,
}

/// Inclusive code-point ranges, sorted by start and non-overlapping
pub const WIDE_SCRIPT_RANGES: &[(u32, u32, WideScript)] = &[
    (0x3040, 0x309F, WideScript::Hiragana),
    (0x30A0, 0x30FF, WideScript::Katakana),
    // CJK Unified Ideographs Extension A
    (0x3400, 0x4DBF, WideScript::Han),
    // CJK Unified Ideographs
    (0x4E00, 0x9FFF, WideScript::Han),
    // CJK Unified Ideographs Extension B
    (0x20000, 0x2A6DF, WideScript::Han),
];

/// Highest ordinal that still counts as one width unit
pub const NARROW_MAX: u32 = 0xFF;

/// Look up the wide script a code point belongs to, if any
pub fn wide_script_of(ch: char) -> Option<WideScript> {
    let cp = ch as u32;
    WIDE_SCRIPT_RANGES
        .binary_search_by(|&(start, end, _)| {
            if end < cp {
                Ordering::Less
            } else if start > cp {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .ok()
        .map(|idx| WIDE_SCRIPT_RANGES[idx].2)
}

/// Whether a single code point is Han, Hiragana or Katakana
#[inline]
pub fn is_wide_char(ch: char) -> bool {
    // Nothing below Hiragana can match
    (ch as u32) >= 0x3040 && wide_script_of(ch).is_some()
}

/// Whether a line should be wrapped as wide-script
pub fn is_wide_script(line: &str) -> bool {
    line.chars().any(is_wide_char)
}

/// Width units contributed by one code point
#[inline]
pub fn char_width(ch: char) -> u32 {
    if (ch as u32) <= NARROW_MAX {
        1
    } else {
        2
    }
}

/// Sum of width units over the whole text
pub fn display_width(text: &str) -> u64 {
    text.chars().map(|ch| u64::from(char_width(ch))).sum()
}
