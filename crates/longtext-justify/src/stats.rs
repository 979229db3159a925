//! Text statistics and line layout helpers

use longtext_core::types::{LayoutOptions, LinePosition, TextStats};
use longtext_unicode::{char_width, is_wide_char, NARROW_MAX};

/// Line height as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.5;

/// Gather read-only statistics about `text`
///
/// `line_count` follows `str::lines`: a trailing newline does not open a new
/// line and empty text has none.
pub fn stats(text: &str) -> TextStats {
    let mut stats = TextStats {
        char_count: 0,
        byte_count: text.len(),
        line_count: text.lines().count(),
        cjk_count: 0,
        ascii_count: 0,
        display_width: 0,
        has_cjk: false,
    };

    for ch in text.chars() {
        stats.char_count += 1;
        stats.display_width += u64::from(char_width(ch));
        if (ch as u32) <= NARROW_MAX {
            stats.ascii_count += 1;
        } else if is_wide_char(ch) {
            stats.cjk_count += 1;
        }
    }
    stats.has_cjk = stats.cjk_count > 0;

    stats
}

/// Place each line at `x = padding`, `y = font_size * 1.5 * index + padding`
pub fn compute_line_positions<S: AsRef<str>>(
    lines: &[S],
    options: &LayoutOptions,
) -> Vec<LinePosition> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| LinePosition {
            text: line.as_ref().to_string(),
            x: options.padding,
            y: options.font_size * LINE_HEIGHT_FACTOR * index as f32 + options.padding,
            line_index: index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_mixed_text() {
        let s = stats("Hi 世界\nok");
        assert_eq!(s.char_count, 8);
        assert_eq!(s.byte_count, 12);
        assert_eq!(s.line_count, 2);
        assert_eq!(s.cjk_count, 2);
        assert_eq!(s.ascii_count, 6);
        assert_eq!(s.display_width, 10);
        assert!(s.has_cjk);
    }

    #[test]
    fn test_stats_line_counting() {
        assert_eq!(stats("").line_count, 0);
        assert_eq!(stats("a").line_count, 1);
        assert_eq!(stats("a\n").line_count, 1);
        assert_eq!(stats("a\r\nb").line_count, 2);
        assert_eq!(stats("\n\n").line_count, 2);
    }

    #[test]
    fn test_stats_non_cjk_wide_chars() {
        // Hangul is two width units but not wide-script
        let s = stats("한");
        assert_eq!(s.display_width, 2);
        assert_eq!(s.cjk_count, 0);
        assert_eq!(s.ascii_count, 0);
        assert!(!s.has_cjk);
    }

    #[test]
    fn test_line_positions() {
        let options = LayoutOptions {
            font_size: 20.0,
            padding: 10.0,
        };
        let positions = compute_line_positions(&["first", "second", "third"], &options);
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].y, 10.0);
        assert_eq!(positions[1].y, 40.0);
        assert_eq!(positions[2].y, 70.0);
        assert!(positions.iter().all(|p| p.x == 10.0));
        assert_eq!(positions[2].line_index, 2);
        assert_eq!(positions[1].text, "second");
    }

    #[test]
    fn test_line_positions_empty() {
        let lines: Vec<String> = Vec::new();
        assert!(compute_line_positions(&lines, &LayoutOptions::default()).is_empty());
    }
}
