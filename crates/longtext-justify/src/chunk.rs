//! Bounded-latency justification for large inputs
//!
//! The text is cut into contiguous chunks of `chunk_size` characters, each
//! chunk is justified on its own and the results are joined with CRLF (unless
//! the previous chunk already ended in one). A line
//! that straddles a chunk boundary is force-broken there; carrying width or
//! word state across chunks is deliberately not attempted.

use crate::justify::justify;
use longtext_core::{types::ProgressEvent, LINE_SEPARATOR};

/// Byte ranges of consecutive `chunk_size`-character slices of `text`
///
/// The last slice may be shorter. `chunk_size` must be at least 1.
pub fn chunk_ranges(text: &str, chunk_size: usize) -> Vec<(usize, usize)> {
    debug_assert!(chunk_size > 0);
    let chunk_size = chunk_size.max(1);
    let mut ranges = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0usize;
    let mut count = 0usize;

    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            ranges.push((start, idx));
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if count > 0 {
        ranges.push((start, text.len()));
    }

    ranges
}

/// Justify `text` in independent chunks, reporting one event per chunk
///
/// Text no longer than `chunk_size` characters goes straight to [`justify`]
/// and reports a single 100% event (none for empty text), so the number of
/// events is always `ceil(chars / chunk_size)`.
pub fn chunked_justify(
    text: &str,
    budget: u32,
    chunk_size: usize,
    mut on_progress: impl FnMut(ProgressEvent),
) -> String {
    let ranges = chunk_ranges(text, chunk_size);
    let total = ranges.len();

    if total <= 1 {
        let out = justify(text, budget);
        if total == 1 {
            on_progress(ProgressEvent::new(1, 1));
        }
        return out;
    }

    log::debug!(
        "Chunking {} bytes into {} chunks of {} chars",
        text.len(),
        total,
        chunk_size
    );

    let mut out = String::with_capacity(text.len() + text.len() / 20);
    for (idx, (start, end)) in ranges.into_iter().enumerate() {
        let piece = justify(&text[start..end], budget);
        out.push_str(&piece);
        if idx + 1 < total && !piece.ends_with(LINE_SEPARATOR) {
            out.push_str(LINE_SEPARATOR);
        }
        on_progress(ProgressEvent::new(idx + 1, total));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_delegates_to_justify() {
        let mut events = Vec::new();
        let out = chunked_justify("Hello World", 20, 1000, |e| events.push(e));
        assert_eq!(out, "Hello World");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].progress, 100.0);
    }

    #[test]
    fn test_empty_text_reports_nothing() {
        let mut events = Vec::new();
        let out = chunked_justify("", 20, 10, |e| events.push(e));
        assert_eq!(out, "");
        assert!(events.is_empty());
    }

    #[test]
    fn test_three_chunks_three_events() {
        let text = "A".repeat(3000);
        let mut events = Vec::new();
        let out = chunked_justify(&text, 50, 1000, |e| events.push(e));

        assert_eq!(events.len(), 3);
        assert!((events[0].progress - 33.33).abs() < 0.01);
        assert!((events[1].progress - 66.66).abs() < 0.01);
        assert_eq!(events[2].progress, 100.0);
        assert_eq!(events[2].chunk, 3);
        assert_eq!(events[2].total, 3);

        // A single unbroken word is never split, so each chunk is one line
        let lines: Vec<&str> = out.split(LINE_SEPARATOR).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == 1000));
    }

    #[test]
    fn test_spaced_text_wraps_near_budget() {
        let text = "A ".repeat(1500);
        let mut count = 0;
        let out = chunked_justify(&text, 50, 1000, |_| count += 1);
        assert_eq!(count, 3);
        for line in out.split(LINE_SEPARATOR) {
            assert!(line.chars().count() <= 50);
        }
    }

    #[test]
    fn test_seam_breaks_at_chunk_boundary() {
        // "abc def" split after 5 chars: "abc d" | "ef"
        let out = chunked_justify("abc def", 80, 5, |_| {});
        assert_eq!(out, "abc d\r\nef");
    }

    #[test]
    fn test_boundary_after_newline_adds_no_blank_line() {
        // Chunks "ab\n" | "cd": the first already ends in CRLF
        assert_eq!(chunked_justify("ab\ncd", 80, 3, |_| {}), "ab\r\ncd");
        // A real blank line straddling the seam survives
        assert_eq!(chunked_justify("ab\n\ncd", 80, 3, |_| {}), "ab\r\n\r\ncd");
    }

    #[test]
    fn test_chunks_respect_char_boundaries() {
        let ranges = chunk_ranges("字字字字字", 2);
        assert_eq!(ranges, vec![(0, 6), (6, 12), (12, 15)]);
        assert!(chunk_ranges("", 3).is_empty());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let text = "word ".repeat(400);
        let mut last = 0.0;
        chunked_justify(&text, 30, 77, |e| {
            assert!(e.progress > last);
            last = e.progress;
        });
        assert_eq!(last, 100.0);
    }
}
