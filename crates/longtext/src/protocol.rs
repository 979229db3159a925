//! Messages exchanged with the offloaded worker
//!
//! Requests travel as `{id, action, payload}`; the worker answers with
//! messages tagged by `type`:
//!
//! ```json
//! {"type": "ready"}
//! {"type": "result", "id": 7, "result": {...}, "processingTime": 1.25, "accelerated": true}
//! {"type": "error", "id": 7, "error": {"message": "..."}}
//! {"type": "progress", "id": 7, "progress": 50.0, "chunk": 1, "total": 2}
//! {"type": "batchProgress", "id": 7, "progress": 100.0, "chunk": 3, "total": 3}
//! ```
//!
//! Results are carried as untyped JSON and decoded against the action the
//! caller asked for, so a worker answering with the wrong shape is caught at
//! the receiving end.

use longtext_core::{
    traits::Verdict,
    types::{JustifyResult, TextStats, TierKind},
    LongtextError, Result, ValidationError, MAX_TEXT_LENGTH,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The operations a caller may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Justify,
    ChunkedJustify,
    BatchJustify,
    Validate,
    Stats,
    IsWideScript,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Justify,
        Action::ChunkedJustify,
        Action::BatchJustify,
        Action::Validate,
        Action::Stats,
        Action::IsWideScript,
    ];

    /// Wire name of the action
    pub fn name(self) -> &'static str {
        match self {
            Action::Justify => "justify",
            Action::ChunkedJustify => "chunkedJustify",
            Action::BatchJustify => "batchJustify",
            Action::Validate => "validate",
            Action::Stats => "stats",
            Action::IsWideScript => "isWideScript",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JustifyPayload {
    pub text: String,
    pub max_chars_per_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkedPayload {
    pub text: String,
    pub max_chars_per_line: u32,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub texts: Vec<String>,
    pub max_chars_per_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

/// A typed request: the action and its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum Request {
    Justify(JustifyPayload),
    ChunkedJustify(ChunkedPayload),
    BatchJustify(BatchPayload),
    Validate(TextPayload),
    Stats(TextPayload),
    IsWideScript(TextPayload),
}

impl Request {
    pub fn justify(text: impl Into<String>, max_chars_per_line: u32) -> Self {
        Request::Justify(JustifyPayload {
            text: text.into(),
            max_chars_per_line,
        })
    }

    pub fn chunked_justify(
        text: impl Into<String>,
        max_chars_per_line: u32,
        chunk_size: usize,
    ) -> Self {
        Request::ChunkedJustify(ChunkedPayload {
            text: text.into(),
            max_chars_per_line,
            chunk_size,
        })
    }

    pub fn batch_justify(texts: Vec<String>, max_chars_per_line: u32) -> Self {
        Request::BatchJustify(BatchPayload {
            texts,
            max_chars_per_line,
        })
    }

    pub fn validate(text: impl Into<String>) -> Self {
        Request::Validate(TextPayload { text: text.into() })
    }

    pub fn stats(text: impl Into<String>) -> Self {
        Request::Stats(TextPayload { text: text.into() })
    }

    pub fn is_wide_script(text: impl Into<String>) -> Self {
        Request::IsWideScript(TextPayload { text: text.into() })
    }

    pub fn action(&self) -> Action {
        match self {
            Request::Justify(_) => Action::Justify,
            Request::ChunkedJustify(_) => Action::ChunkedJustify,
            Request::BatchJustify(_) => Action::BatchJustify,
            Request::Validate(_) => Action::Validate,
            Request::Stats(_) => Action::Stats,
            Request::IsWideScript(_) => Action::IsWideScript,
        }
    }

    /// Build a request from an action name and an untyped JSON payload
    ///
    /// Unknown names fail with [`LongtextError::UnknownAction`]; a missing or
    /// null `text` is [`ValidationError::Empty`], any other mistyped field is
    /// [`ValidationError::WrongType`], and an out-of-range width or chunk size
    /// gets its own validation error.
    pub fn from_parts(action: &str, payload: Value) -> Result<Self> {
        let kind = Action::from_name(action)
            .ok_or_else(|| LongtextError::UnknownAction(action.to_string()))?;

        if kind == Action::BatchJustify {
            match payload.get("texts") {
                Some(Value::Array(items)) => {
                    for item in items {
                        check_text_type(Some(item))?;
                    }
                }
                Some(Value::Null) | None => return Err(ValidationError::Empty.into()),
                Some(_) => return Err(ValidationError::WrongType.into()),
            }
        } else {
            check_text_type(payload.get("text"))?;
        }

        if let Some(width) = payload.get("maxCharsPerLine").and_then(Value::as_i64) {
            if width < 1 || width > i64::from(u32::MAX) {
                return Err(ValidationError::InvalidWidth(width.max(0) as u64).into());
            }
        }
        if let Some(size) = payload.get("chunkSize").and_then(Value::as_i64) {
            if size < 1 {
                return Err(ValidationError::InvalidChunkSize(0).into());
            }
        }

        let envelope = serde_json::json!({ "action": action, "payload": payload });
        serde_json::from_value(envelope).map_err(|e| {
            log::debug!("Rejecting {action} payload: {e}");
            LongtextError::Validation(ValidationError::WrongType)
        })
    }
}

fn check_text_type(value: Option<&Value>) -> std::result::Result<(), ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::Empty),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::WrongType),
    }
}

/// A request as it travels to the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: u64,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Everything the worker may say
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    Ready,
    Result {
        id: u64,
        result: Value,
        /// Milliseconds spent computing
        #[serde(rename = "processingTime")]
        processing_time: f64,
        #[serde(default)]
        accelerated: bool,
    },
    Error {
        id: u64,
        error: ErrorBody,
    },
    Progress {
        id: u64,
        progress: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<usize>,
    },
    BatchProgress {
        id: u64,
        progress: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<usize>,
    },
}

/// The value a tier computed, before it is dressed up for the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Justified { text: String, chunked: bool },
    Batch(Vec<String>),
    Validated(Verdict),
    Stats(TextStats),
    WideScript(bool),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JustifiedWire {
    justified_text: String,
    chunked: bool,
}

#[derive(Serialize, Deserialize)]
struct BatchWire {
    results: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationWire {
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WideScriptWire {
    is_wide_script: bool,
}

impl Output {
    /// Encode as the `result` field of a worker message
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Output::Justified { text, chunked } => serde_json::to_value(JustifiedWire {
                justified_text: text.clone(),
                chunked: *chunked,
            }),
            Output::Batch(results) => serde_json::to_value(BatchWire {
                results: results.clone(),
            }),
            Output::Validated(verdict) => {
                let wire = match verdict {
                    Ok(()) => ValidationWire {
                        valid: true,
                        reason: None,
                        length: None,
                    },
                    Err(e) => ValidationWire {
                        valid: false,
                        reason: Some(e.reason().to_string()),
                        length: match e {
                            ValidationError::TooLarge { len, .. } => Some(*len),
                            _ => None,
                        },
                    },
                };
                serde_json::to_value(wire)
            }
            Output::Stats(stats) => serde_json::to_value(stats),
            Output::WideScript(wide) => serde_json::to_value(WideScriptWire {
                is_wide_script: *wide,
            }),
        }
    }

    /// Decode a `result` field, expecting the shape `action` produces
    pub fn from_value(action: Action, value: Value) -> std::result::Result<Self, String> {
        let malformed = |e: serde_json::Error| format!("malformed {action} result: {e}");

        match action {
            Action::Justify | Action::ChunkedJustify => {
                let wire: JustifiedWire = serde_json::from_value(value).map_err(malformed)?;
                Ok(Output::Justified {
                    text: wire.justified_text,
                    chunked: wire.chunked,
                })
            }
            Action::BatchJustify => {
                let wire: BatchWire = serde_json::from_value(value).map_err(malformed)?;
                Ok(Output::Batch(wire.results))
            }
            Action::Validate => {
                let wire: ValidationWire = serde_json::from_value(value).map_err(malformed)?;
                if wire.valid {
                    return Ok(Output::Validated(Ok(())));
                }
                let error = match wire.reason.as_deref() {
                    Some("empty") => ValidationError::Empty,
                    Some("wrong-type") => ValidationError::WrongType,
                    Some("too-large") => ValidationError::TooLarge {
                        len: wire.length.unwrap_or(MAX_TEXT_LENGTH + 1),
                        max: MAX_TEXT_LENGTH,
                    },
                    other => return Err(format!("unknown validation reason {other:?}")),
                };
                Ok(Output::Validated(Err(error)))
            }
            Action::Stats => Ok(Output::Stats(
                serde_json::from_value(value).map_err(malformed)?,
            )),
            Action::IsWideScript => {
                let wire: WideScriptWire = serde_json::from_value(value).map_err(malformed)?;
                Ok(Output::WideScript(wire.is_wide_script))
            }
        }
    }
}

/// Texts justified in one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub results: Vec<String>,
    pub tier_used: TierKind,
    pub accelerated: bool,
}

/// What [`Orchestrator::process`](crate::Orchestrator::process) resolves with
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Justified(JustifyResult),
    Batch(BatchResult),
    Validated(Verdict),
    Stats(TextStats),
    WideScript(bool),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("render"), None);
    }

    #[test]
    fn test_request_wire_shape() {
        let req = WorkerRequest {
            id: 3,
            request: Request::chunked_justify("abc", 10, 5),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "action": "chunkedJustify",
                "payload": {"text": "abc", "maxCharsPerLine": 10, "chunkSize": 5}
            })
        );
    }

    #[test]
    fn test_from_parts() {
        let req = Request::from_parts(
            "justify",
            json!({"text": "Hello World", "maxCharsPerLine": 20}),
        )
        .unwrap();
        assert_eq!(req, Request::justify("Hello World", 20));

        let req = Request::from_parts("isWideScript", json!({"text": "字"})).unwrap();
        assert_eq!(req.action(), Action::IsWideScript);
    }

    #[test]
    fn test_from_parts_rejections() {
        let err = Request::from_parts("explode", json!({})).unwrap_err();
        assert!(matches!(err, LongtextError::UnknownAction(ref a) if a == "explode"));

        let err = Request::from_parts("validate", json!({"text": 42})).unwrap_err();
        assert!(matches!(
            err,
            LongtextError::Validation(ValidationError::WrongType)
        ));

        let err = Request::from_parts("stats", json!({"text": null})).unwrap_err();
        assert!(matches!(err, LongtextError::Validation(ValidationError::Empty)));

        let err = Request::from_parts("justify", json!({"text": "x", "maxCharsPerLine": -4}))
            .unwrap_err();
        assert!(matches!(
            err,
            LongtextError::Validation(ValidationError::InvalidWidth(0))
        ));

        let err = Request::from_parts("justify", json!({"text": "x", "maxCharsPerLine": "ten"}))
            .unwrap_err();
        assert!(matches!(
            err,
            LongtextError::Validation(ValidationError::WrongType)
        ));

        let err = Request::from_parts("batchJustify", json!({"texts": ["a", 1], "maxCharsPerLine": 5}))
            .unwrap_err();
        assert!(matches!(
            err,
            LongtextError::Validation(ValidationError::WrongType)
        ));
    }

    #[test]
    fn test_message_tags() {
        let msg: WorkerMessage = serde_json::from_value(json!({
            "type": "result",
            "id": 9,
            "result": {"justifiedText": "a", "chunked": false},
            "processingTime": 0.5
        }))
        .unwrap();
        assert!(matches!(msg, WorkerMessage::Result { id: 9, accelerated: false, .. }));

        let ready = serde_json::to_value(WorkerMessage::Ready).unwrap();
        assert_eq!(ready, json!({"type": "ready"}));

        let progress = serde_json::to_value(WorkerMessage::BatchProgress {
            id: 1,
            progress: 50.0,
            chunk: Some(1),
            total: Some(2),
        })
        .unwrap();
        assert_eq!(progress["type"], "batchProgress");

        let error = serde_json::to_value(WorkerMessage::Error {
            id: 2,
            error: ErrorBody {
                message: "boom".into(),
            },
        })
        .unwrap();
        assert_eq!(error, json!({"type": "error", "id": 2, "error": {"message": "boom"}}));
    }

    #[test]
    fn test_validation_output_carries_reason() {
        let output = Output::Validated(Err(ValidationError::TooLarge {
            len: 500_001,
            max: MAX_TEXT_LENGTH,
        }));
        let value = output.to_value().unwrap();
        assert_eq!(value["reason"], "too-large");
        assert_eq!(Output::from_value(Action::Validate, value).unwrap(), output);
    }

    #[test]
    fn test_output_shape_mismatch_is_reported() {
        let err = Output::from_value(Action::Stats, json!({"justifiedText": "x"})).unwrap_err();
        assert!(err.contains("malformed stats result"));
    }
}
