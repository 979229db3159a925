//! The contract every accelerated module signs
//!
//! The orchestrator treats the native module as an optional fast path: each
//! primitive may answer, or may decline with a [`BackendError`], in which case
//! the caller reruns the same primitive on the pure implementation. Output for
//! any input a module does answer must be byte-identical to the pure path.

use crate::{
    error::{BackendError, ValidationError},
    types::{ProgressEvent, TextStats},
};

/// Outcome of a native `validate` call: the call itself may fail (outer
/// result), and a successful call carries the verdict (inner result).
pub type Verdict = std::result::Result<(), ValidationError>;

/// An accelerated implementation of the justification primitives
///
/// ```ignore
/// struct Passthrough;
///
/// impl NativeModule for Passthrough {
///     fn name(&self) -> &'static str {
///         "passthrough"
///     }
///
///     fn justify(&self, _text: &str, _budget: u32) -> Result<String, BackendError> {
///         Err(BackendError::Unsupported("everything".into()))
///     }
///     // ...
/// }
/// ```
pub trait NativeModule: Send + Sync {
    /// Identify yourself in logs
    fn name(&self) -> &'static str;

    /// Justify `text` to `budget` width units per line
    fn justify(&self, text: &str, budget: u32) -> Result<String, BackendError>;

    /// Justify in independent chunks of `chunk_size` characters
    ///
    /// A module that declines must do so before emitting any progress event,
    /// so a fallthrough never reports a chunk twice.
    fn chunked_justify(
        &self,
        text: &str,
        budget: u32,
        chunk_size: usize,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<String, BackendError>;

    /// Check text against the input limits
    fn validate(&self, text: &str) -> Result<Verdict, BackendError>;

    /// Read-only text statistics
    fn stats(&self, text: &str) -> Result<TextStats, BackendError>;

    /// Whether the line holds any wide-script code point
    fn is_wide_script(&self, text: &str) -> Result<bool, BackendError>;
}
