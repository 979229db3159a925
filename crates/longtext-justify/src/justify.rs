//! Line wrapping: width accumulation for wide scripts, greedy words for the rest

use longtext_core::LINE_SEPARATOR;
use longtext_unicode::{char_width, is_wide_script};

/// Counter value right after an explicit break inside a wide-script line
const BREAK_RESET_WIDTH: i64 = -1;

/// Split on `\r\n`, `\r` or `\n`, keeping empty lines
///
/// `"a\n"` yields `["a", ""]`; a `\r\n` pair is one break.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(|c: char| c == '\r' || c == '\n') {
            Some(idx) => {
                let skip = if current[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[idx + skip..]);
                Some(&current[..idx])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Wrap a wide-script line by accumulating width units
///
/// Each code point's width is added before the check; when the running total
/// passes `budget` a break goes in front of that code point and the total
/// restarts at its width. The first code point of a line is no exception, so
/// a character wider than `budget` always starts after a break. Explicit
/// breaks are normalized to CRLF.
pub fn justify_wide(line: &str, budget: u32) -> String {
    let budget = i64::from(budget);
    let mut out = String::with_capacity(line.len() + line.len() / 20);
    let mut width: i64 = 0;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(LINE_SEPARATOR);
                width = BREAK_RESET_WIDTH;
            }
            _ => {
                let ch_width = i64::from(char_width(ch));
                width += ch_width;
                if width > budget {
                    out.push_str(LINE_SEPARATOR);
                    width = ch_width;
                }
                out.push(ch);
            }
        }
    }

    out
}

/// Greedy word wrap for narrow-script lines
///
/// Words are never split: a word longer than `budget` sits alone on its line.
pub fn justify_narrow(line: &str, budget: u32) -> String {
    let budget = budget as usize;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::with_capacity(budget.min(line.len()));
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let space_needed = usize::from(current_len > 0);

        if current_len + space_needed + word_len <= budget {
            if space_needed == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_len += space_needed + word_len;
        } else {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines.join(LINE_SEPARATOR)
}

/// Justify a whole text, one input line at a time
///
/// Lines are trimmed, classified, wrapped with the matching strategy and
/// rejoined with CRLF. Empty lines stay as blank lines. Pure and
/// deterministic; `budget` is not range-checked here.
pub fn justify(text: &str, budget: u32) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 20);

    for (idx, line) in split_lines(text).enumerate() {
        if idx > 0 {
            out.push_str(LINE_SEPARATOR);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_wide_script(trimmed) {
            out.push_str(&justify_wide(trimmed, budget));
        } else {
            out.push_str(&justify_narrow(trimmed, budget));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_latin_line_unchanged() {
        assert_eq!(justify("Hello World", 20), "Hello World");
    }

    #[test]
    fn test_cjk_breaks_after_budget_width() {
        let out = justify("这是一个测试文本", 10);
        assert_eq!(out, "这是一个测\r\n试文本");
    }

    #[test]
    fn test_newline_variants_become_crlf() {
        assert_eq!(justify("Line1\nLine2", 50), "Line1\r\nLine2");
        assert_eq!(justify("Line1\r\nLine2", 50), "Line1\r\nLine2");
        assert_eq!(justify("Line1\rLine2", 50), "Line1\r\nLine2");
    }

    #[test]
    fn test_blank_lines_preserved() {
        assert_eq!(justify("a\n\nb", 10), "a\r\n\r\nb");
        assert_eq!(justify("a\n   \nb", 10), "a\r\n\r\nb");
        assert_eq!(justify("a\n", 10), "a\r\n");
        assert_eq!(justify("", 10), "");
    }

    #[test]
    fn test_lines_are_trimmed() {
        assert_eq!(justify("   padded   ", 20), "padded");
    }

    #[test]
    fn test_narrow_greedy_packing() {
        assert_eq!(
            justify_narrow("the quick brown fox jumps", 10),
            "the quick\r\nbrown fox\r\njumps"
        );
    }

    #[test]
    fn test_narrow_collapses_whitespace_runs() {
        assert_eq!(justify_narrow("a  \t b", 10), "a b");
    }

    #[test]
    fn test_narrow_never_splits_long_word() {
        assert_eq!(
            justify_narrow("tiny supercalifragilistic end", 8),
            "tiny\r\nsupercalifragilistic\r\nend"
        );
    }

    #[test]
    fn test_narrow_counts_characters_not_bytes() {
        // 5 characters, 10 bytes
        assert_eq!(justify_narrow("ééééé ab", 8), "ééééé ab");
    }

    #[test]
    fn test_wide_explicit_breaks_reset_width() {
        assert_eq!(justify_wide("字字\n字字", 4), "字字\r\n字字");
        assert_eq!(justify_wide("字\r\n字", 4), "字\r\n字");
    }

    #[test]
    fn test_wide_reset_offset_gives_one_unit_margin() {
        // After an explicit break the counter restarts at -1
        assert_eq!(justify_wide("x\nabcde", 4), "x\r\nabcde");
        assert_eq!(justify_wide("abcde", 4), "abcd\r\ne");
    }

    #[test]
    fn test_wide_mixed_width_accounting() {
        // a=1, 字=2 → "a字a" is 4 units, next 字 overflows
        assert_eq!(justify_wide("a字a字", 4), "a字a\r\n字");
    }

    #[test]
    fn test_wide_char_over_budget_breaks_before_itself() {
        // Width 2 overflows budget 1 even at the start of a line
        assert_eq!(justify_wide("字字", 1), "\r\n字\r\n字");
        assert_eq!(justify("字", 1), "\r\n字");
        assert_eq!(justify_wide("a字", 1), "a\r\n字");
    }

    #[test]
    fn test_mixed_line_classified_wide() {
        // One ideograph switches the whole line to width accumulation,
        // so the English words get cut mid-word
        let out = justify("Hello 世界 wonderful", 8);
        assert_eq!(out, "Hello 世\r\n界 wonde\r\nrful");
    }

    #[test]
    fn test_split_lines() {
        let parts: Vec<&str> = split_lines("a\r\nb\rc\nd").collect();
        assert_eq!(parts, vec!["a", "b", "c", "d"]);
        let parts: Vec<&str> = split_lines("").collect();
        assert_eq!(parts, vec![""]);
        let parts: Vec<&str> = split_lines("\n").collect();
        assert_eq!(parts, vec!["", ""]);
    }
}
