//! Input limits, checked before any tier sees the text

use longtext_core::{ValidationError, MAX_TEXT_LENGTH, MAX_WIDTH_BUDGET};
use serde_json::Value;

/// Validate text input length.
///
/// Empty text is rejected, and so is anything longer than
/// [`MAX_TEXT_LENGTH`] characters. The limit itself is accepted.
pub fn validate(text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    // Cheap byte check first: a UTF-8 char is at least one byte
    if text.len() > MAX_TEXT_LENGTH {
        let len = text.chars().count();
        if len > MAX_TEXT_LENGTH {
            return Err(ValidationError::TooLarge {
                len,
                max: MAX_TEXT_LENGTH,
            });
        }
    }

    Ok(())
}

/// Validate a loosely typed value, as it arrives over the wire
pub fn validate_value(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::String(text) => validate(text),
        Value::Null => Err(ValidationError::Empty),
        _ => Err(ValidationError::WrongType),
    }
}

/// Validate a width budget
pub fn validate_width(budget: u32) -> Result<(), ValidationError> {
    if budget == 0 || budget > MAX_WIDTH_BUDGET {
        return Err(ValidationError::InvalidWidth(u64::from(budget)));
    }
    Ok(())
}

/// Validate a chunk size
pub fn validate_chunk_size(chunk_size: usize) -> Result<(), ValidationError> {
    if chunk_size == 0 {
        return Err(ValidationError::InvalidChunkSize(chunk_size));
    }
    Ok(())
}
