//! Longtext - script-aware justification of very long texts
//!
//! Hand it a long string and a width budget, get back fixed-width lines and
//! where to draw them. Lines holding Han, Hiragana or Katakana are wrapped by
//! accumulating display width; everything else is word-wrapped.
//!
//! Work runs on one of two tiers:
//!
//! - **Offloaded**: a single worker thread, talked to through correlated
//!   request/response messages with progress in between
//! - **Fallback**: the caller's own task, used when offloading is off,
//!   never came up, or broke
//!
//! Either tier first tries the accelerated native module and quietly falls
//! back to the pure implementation when it declines. The justified text is
//! the same whichever path produced it.
//!
//! # Example
//!
//! ```ignore
//! use longtext::prelude::*;
//!
//! let orchestrator = Orchestrator::builder().build()?;
//!
//! let result = orchestrator.justify("Line1\nLine2", 50).await?;
//! assert_eq!(result.justified_text, "Line1\r\nLine2");
//!
//! let progress: ProgressCallback = Arc::new(|e| println!("{:.0}%", e.progress));
//! let big = orchestrator
//!     .chunked_justify("A".repeat(3000), 50, 1000, Some(progress))
//!     .await?;
//! ```
//!
//! # Feature Flags
//!
//! - `accel` (default): the byte-level native module for ASCII input

pub mod backend;
pub mod config;
pub mod kernel;
pub mod native;
pub mod orchestrator;
pub mod pending;
pub mod protocol;
pub mod state;
pub mod worker;

pub use config::OrchestratorConfig;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use pending::ProgressCallback;
pub use protocol::{Action, BatchResult, Request, Response};

pub use longtext_core::{
    error, traits, types, BackendError, BackendState, LongtextError, NativeModule, Result,
    ValidationError, LINE_SEPARATOR, MAX_TEXT_LENGTH,
};
pub use longtext_justify::{compute_line_positions, justify};
pub use longtext_unicode::{char_width, display_width, is_wide_script};

/// Everything most callers need
pub mod prelude {
    pub use crate::{
        Orchestrator, OrchestratorConfig, ProgressCallback, Request, Response,
    };
    pub use longtext_core::{
        types::{JustifyResult, LayoutOptions, ProgressEvent, TextStats, TierKind},
        BackendState, LongtextError, Result,
    };
    pub use std::sync::Arc;
}
