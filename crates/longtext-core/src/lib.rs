//! Longtext Core: the shared vocabulary of the justification engine
//!
//! Text comes in as one long string and leaves as an ordered list of
//! fixed-width lines plus the nominal position of each line. Every crate in
//! the workspace speaks through the types defined here.
//!
//! ## What lives here
//!
//! - [`types`] - progress events, statistics, layout positions, results
//! - [`error`] - the error taxonomy: validation, backend, protocol, timeout
//! - [`traits::NativeModule`] - the accelerated fast path contract
//! - [`BackendState`] - the tier state machine shared by orchestrators
//!
//! Width accounting is fixed across the engine: a code point with ordinal
//! ≤ 255 is one width unit, anything else is two.

pub mod error;
pub mod traits;

pub use error::{BackendError, LongtextError, Result, ValidationError};
pub use traits::{NativeModule, Verdict};

/// Joins every justified output line
pub const LINE_SEPARATOR: &str = "\r\n";

/// Largest accepted input, in characters (inclusive)
pub const MAX_TEXT_LENGTH: usize = 500_000;

/// Largest accepted width budget
///
/// Twice the text limit: no line can ever be wider than that.
pub const MAX_WIDTH_BUDGET: u32 = 1_000_000;

/// The data structures that flow between tiers and callers
pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// One step of chunked or batched work
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct ProgressEvent {
        /// Percentage complete, 0..=100
        pub progress: f64,
        /// How many units are done (1-based)
        pub chunk: usize,
        /// How many units there are in total
        pub total: usize,
    }

    impl ProgressEvent {
        /// Event for `completed` out of `total` units
        pub fn new(completed: usize, total: usize) -> Self {
            let progress = if total == 0 {
                100.0
            } else {
                completed as f64 / total as f64 * 100.0
            };
            Self {
                progress,
                chunk: completed,
                total,
            }
        }
    }

    /// Read-only analysis of a text, independent of justification
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TextStats {
        pub char_count: usize,
        pub byte_count: usize,
        pub line_count: usize,
        /// Wide-script (Han, Hiragana, Katakana) code points
        pub cjk_count: usize,
        /// Code points with ordinal ≤ 255
        pub ascii_count: usize,
        pub display_width: u64,
        pub has_cjk: bool,
    }

    /// Font size and padding used to place lines on a canvas
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LayoutOptions {
        pub font_size: f32,
        pub padding: f32,
    }

    impl Default for LayoutOptions {
        fn default() -> Self {
            Self {
                font_size: 16.0,
                padding: 20.0,
            }
        }
    }

    /// Where a justified line sits on the canvas
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinePosition {
        pub text: String,
        pub x: f32,
        pub y: f32,
        pub line_index: usize,
    }

    /// Which tier ended up doing the work
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum TierKind {
        /// The background worker answered
        Offloaded,
        /// The caller's own control flow computed it
        Fallback,
    }

    impl fmt::Display for TierKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                TierKind::Offloaded => write!(f, "offloaded"),
                TierKind::Fallback => write!(f, "fallback"),
            }
        }
    }

    /// Everything a caller gets back from a justification request
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct JustifyResult {
        pub justified_text: String,
        pub lines: Vec<String>,
        pub line_positions: Vec<LinePosition>,
        pub chunked: bool,
        pub tier_used: TierKind,
        /// The native fast path produced the text
        pub accelerated: bool,
    }
}

/// Lifecycle of the tier an orchestrator dispatches to
///
/// ```text
/// Uninitialized ──► Initializing ──► Ready
///        │               │             │
///        └───────────────┴──► Fallback ◄┘
///
/// any state ──► Terminated
/// ```
///
/// `Fallback` is a latch: nothing leads back to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendState {
    Uninitialized,
    Initializing,
    Ready,
    Fallback,
    Terminated,
}

impl BackendState {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: BackendState) -> bool {
        use BackendState::*;
        match (self, next) {
            (Terminated, _) => false,
            (_, Terminated) => true,
            (Uninitialized, Initializing) | (Uninitialized, Fallback) => true,
            (Initializing, Ready) | (Initializing, Fallback) => true,
            (Ready, Fallback) => true,
            _ => false,
        }
    }

    /// Still waiting to learn which tier will serve requests
    pub fn is_pending(self) -> bool {
        matches!(self, BackendState::Uninitialized | BackendState::Initializing)
    }
}

impl std::fmt::Display for BackendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendState::Uninitialized => "uninitialized",
            BackendState::Initializing => "initializing",
            BackendState::Ready => "ready",
            BackendState::Fallback => "fallback",
            BackendState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;
    use super::*;

    #[test]
    fn test_fallback_is_a_latch() {
        assert!(BackendState::Ready.can_transition_to(BackendState::Fallback));
        assert!(!BackendState::Fallback.can_transition_to(BackendState::Ready));
        assert!(!BackendState::Fallback.can_transition_to(BackendState::Initializing));
        assert!(BackendState::Fallback.can_transition_to(BackendState::Terminated));
    }

    #[test]
    fn test_terminated_is_final() {
        for next in [
            BackendState::Uninitialized,
            BackendState::Initializing,
            BackendState::Ready,
            BackendState::Fallback,
            BackendState::Terminated,
        ] {
            assert!(!BackendState::Terminated.can_transition_to(next));
        }
    }

    #[test]
    fn test_initialization_paths() {
        use BackendState::*;
        assert!(Uninitialized.can_transition_to(Initializing));
        assert!(Uninitialized.can_transition_to(Fallback));
        assert!(Initializing.can_transition_to(Ready));
        assert!(Initializing.can_transition_to(Fallback));
        assert!(!Uninitialized.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Initializing));
    }

    #[test]
    fn test_progress_event_percentages() {
        let first = ProgressEvent::new(1, 3);
        assert!((first.progress - 33.333).abs() < 0.01);
        assert_eq!(first.chunk, 1);
        assert_eq!(first.total, 3);
        assert_eq!(ProgressEvent::new(3, 3).progress, 100.0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = TextStats {
            char_count: 2,
            byte_count: 4,
            line_count: 1,
            cjk_count: 1,
            ascii_count: 1,
            display_width: 3,
            has_cjk: true,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["charCount"], 2);
        assert_eq!(json["displayWidth"], 3);
        assert_eq!(json["hasCjk"], true);
    }
}
