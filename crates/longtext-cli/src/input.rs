//! Reading input text

use crate::{cli::TextInput, Result};
use std::io::Read;

/// Positional text, else `--text-file`, else all of stdin
///
/// One trailing newline is dropped from file and stdin input, so
/// `echo text | longtext justify` does not end in a blank line.
pub fn read_text(input: &TextInput) -> Result<String> {
    if let Some(text) = &input.text {
        return Ok(text.clone());
    }

    let mut text = match &input.text_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}
