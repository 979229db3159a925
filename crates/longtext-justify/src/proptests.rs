use super::*;
use longtext_core::LINE_SEPARATOR;
use longtext_unicode::{char_width, is_wide_script};
use proptest::prelude::*;

fn wide_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('字'),
            Just('あ'),
            Just('カ'),
            Just('a'),
            Just('é'),
            Just(' '),
            Just('한'),
        ],
        1..200,
    )
    .prop_map(|chars| {
        let mut s: String = chars.into_iter().collect();
        s.push('字');
        s.trim().to_string()
    })
}

// Property: narrow lines that already fit come back untouched
proptest! {
    #[test]
    fn prop_fitting_narrow_line_unchanged(
        words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..8),
        slack in 0u32..20,
    ) {
        let line = words.join(" ");
        let budget = line.chars().count() as u32 + slack;
        prop_assert_eq!(justify(&line, budget), line);
    }
}

// Property: wide-script sub-lines never exceed the budget, and no code point is split
proptest! {
    #[test]
    fn prop_wide_lines_within_budget(text in wide_text(), budget in 2u32..40) {
        prop_assume!(is_wide_script(&text));
        let out = justify(&text, budget);

        for line in out.split(LINE_SEPARATOR) {
            let width: u32 = line.chars().map(char_width).sum();
            prop_assert!(width <= budget, "line {:?} is {} wide", line, width);
        }

        // Removing the inserted breaks restores the trimmed input exactly
        prop_assert_eq!(out.replace(LINE_SEPARATOR, ""), text);
    }
}

// Property: narrow sub-lines respect the budget unless they are one long word
proptest! {
    #[test]
    fn prop_narrow_lines_within_budget(
        words in prop::collection::vec("[a-z]{1,15}", 1..30),
        budget in 1u32..30,
    ) {
        let line = words.join(" ");
        let out = justify(&line, budget);

        for sub in out.split(LINE_SEPARATOR) {
            let len = sub.chars().count() as u32;
            if len > budget {
                prop_assert!(!sub.contains(' '), "overflowing line {:?} holds several words", sub);
            }
        }

        let rejoined: Vec<&str> = out.split_whitespace().collect();
        let original: Vec<&str> = line.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);
    }
}

// Property: justify is deterministic
proptest! {
    #[test]
    fn prop_justify_deterministic(s in "\\PC{0,300}", budget in 1u32..80) {
        prop_assert_eq!(justify(&s, budget), justify(&s, budget));
    }
}

// Property: chunked progress emits exactly ceil(len / chunk) events ending at 100
proptest! {
    #[test]
    fn prop_chunk_event_count(s in "[a-z 字\n]{0,400}", chunk_size in 1usize..120) {
        let mut events = Vec::new();
        chunked_justify(&s, 20, chunk_size, |e| events.push(e));

        let len = s.chars().count();
        prop_assert_eq!(events.len(), len.div_ceil(chunk_size));
        if let Some(last) = events.last() {
            prop_assert_eq!(last.progress, 100.0);
        }
    }
}
