// this_file: crates/longtext-justify/src/lib.rs

//! The pure algorithmic implementation of every longtext primitive.
//!
//! Nothing here performs I/O or keeps state: the same `(text, budget)` always
//! yields the same string. Every tier in the orchestrator ends up here when
//! the native fast path declines.

pub mod chunk;
pub mod justify;
pub mod stats;
pub mod validate;

pub use chunk::{chunk_ranges, chunked_justify};
pub use justify::{justify, justify_narrow, justify_wide, split_lines};
pub use stats::{compute_line_positions, stats, LINE_HEIGHT_FACTOR};
pub use validate::{validate, validate_chunk_size, validate_value, validate_width};

use longtext_core::types::ProgressEvent;

/// Justify several texts with one budget, reporting after each text
pub fn batch_justify<S: AsRef<str>>(
    texts: &[S],
    budget: u32,
    mut on_progress: impl FnMut(ProgressEvent),
) -> Vec<String> {
    let total = texts.len();
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            let out = justify(text.as_ref(), budget);
            on_progress(ProgressEvent::new(idx + 1, total));
            out
        })
        .collect()
}

#[cfg(test)]
mod proptests;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_matches_single_calls() {
        let texts = ["Hello World", "这是一个测试文本", "Line1\nLine2"];
        let mut events = Vec::new();
        let out = batch_justify(&texts, 10, |e| events.push(e));

        assert_eq!(out.len(), 3);
        for (text, justified) in texts.iter().zip(&out) {
            assert_eq!(justified, &justify(text, 10));
        }
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].progress, 100.0);
    }

    #[test]
    fn test_batch_empty() {
        let texts: Vec<String> = Vec::new();
        let out = batch_justify(&texts, 10, |_| panic!("no progress expected"));
        assert!(out.is_empty());
    }
}
