//! Accelerated module - byte-level justification for ASCII input
//!
//! ASCII text is narrow-script by construction: every byte is one character
//! and one width unit, so wrapping reduces to scanning bytes against a class
//! table and copying word slices into a single output buffer. No character
//! decoding, no per-line allocation.
//!
//! Anything outside ASCII is declined with [`BackendError::Unsupported`] and
//! handled by the pure implementation instead. The declining happens before
//! any progress is reported.

use longtext_core::{
    error::BackendError,
    traits::{NativeModule, Verdict},
    types::{ProgressEvent, TextStats},
    ValidationError, LINE_SEPARATOR, MAX_TEXT_LENGTH,
};

/// What a byte means to the wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteClass {
    /// `\r` or `\n`
    Break,
    /// Whitespace inside a line (same set as `char::is_whitespace` in ASCII)
    Space,
    Word,
}

/// The byte-level fast path
pub struct AccelModule {
    classes: [ByteClass; 128],
}

impl AccelModule {
    /// Build the class table
    pub fn load() -> Result<Self, BackendError> {
        let mut classes = [ByteClass::Word; 128];
        for byte in [b'\t', 0x0B, 0x0C, b' '] {
            classes[byte as usize] = ByteClass::Space;
        }
        classes[b'\r' as usize] = ByteClass::Break;
        classes[b'\n' as usize] = ByteClass::Break;

        log::debug!("AccelModule: class table ready");
        Ok(Self { classes })
    }

    #[inline]
    fn class(&self, byte: u8) -> ByteClass {
        self.classes[(byte & 0x7F) as usize]
    }

    fn ascii<'a>(&self, text: &'a str) -> Result<&'a [u8], BackendError> {
        if text.is_ascii() {
            Ok(text.as_bytes())
        } else {
            Err(BackendError::Unsupported("non-ASCII text".into()))
        }
    }

    /// Greedy word wrap of one line that holds no break bytes
    fn wrap_line(&self, line: &[u8], budget: usize, out: &mut Vec<u8>) {
        let mut line_len = 0usize;
        let mut i = 0usize;

        while i < line.len() {
            while i < line.len() && self.class(line[i]) == ByteClass::Space {
                i += 1;
            }
            if i == line.len() {
                break;
            }

            let start = i;
            while i < line.len() && self.class(line[i]) != ByteClass::Space {
                i += 1;
            }
            let word = &line[start..i];

            let space_needed = usize::from(line_len > 0);
            if line_len + space_needed + word.len() <= budget {
                if space_needed == 1 {
                    out.push(b' ');
                }
                line_len += space_needed + word.len();
            } else {
                if line_len > 0 {
                    out.extend_from_slice(LINE_SEPARATOR.as_bytes());
                }
                line_len = word.len();
            }
            out.extend_from_slice(word);
        }
    }

    fn justify_bytes(&self, bytes: &[u8], budget: usize, out: &mut Vec<u8>) {
        let mut start = 0usize;
        let mut i = 0usize;

        while i < bytes.len() {
            if self.class(bytes[i]) == ByteClass::Break {
                self.wrap_line(&bytes[start..i], budget, out);
                out.extend_from_slice(LINE_SEPARATOR.as_bytes());
                if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            i += 1;
        }

        self.wrap_line(&bytes[start..], budget, out);
    }

    fn finish(out: Vec<u8>) -> Result<String, BackendError> {
        String::from_utf8(out).map_err(|e| BackendError::Failed(e.to_string()))
    }
}

impl NativeModule for AccelModule {
    fn name(&self) -> &'static str {
        "accel-ascii"
    }

    fn justify(&self, text: &str, budget: u32) -> Result<String, BackendError> {
        let bytes = self.ascii(text)?;
        let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 20);
        self.justify_bytes(bytes, budget as usize, &mut out);
        Self::finish(out)
    }

    fn chunked_justify(
        &self,
        text: &str,
        budget: u32,
        chunk_size: usize,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<String, BackendError> {
        if chunk_size == 0 {
            return Err(BackendError::Failed("chunk size must be positive".into()));
        }
        let bytes = self.ascii(text)?;
        let total = bytes.len().div_ceil(chunk_size);
        let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 20);

        if total <= 1 {
            self.justify_bytes(bytes, budget as usize, &mut out);
            if total == 1 {
                progress(ProgressEvent::new(1, 1));
            }
            return Self::finish(out);
        }

        let separator = LINE_SEPARATOR.as_bytes();
        for (idx, chunk) in bytes.chunks(chunk_size).enumerate() {
            let mark = out.len();
            self.justify_bytes(chunk, budget as usize, &mut out);
            if idx + 1 < total && !out[mark..].ends_with(separator) {
                out.extend_from_slice(separator);
            }
            progress(ProgressEvent::new(idx + 1, total));
        }

        Self::finish(out)
    }

    fn validate(&self, text: &str) -> Result<Verdict, BackendError> {
        if text.is_empty() {
            return Ok(Err(ValidationError::Empty));
        }
        let len = if text.is_ascii() {
            text.len()
        } else {
            text.chars().count()
        };
        if len > MAX_TEXT_LENGTH {
            return Ok(Err(ValidationError::TooLarge {
                len,
                max: MAX_TEXT_LENGTH,
            }));
        }
        Ok(Ok(()))
    }

    fn stats(&self, text: &str) -> Result<TextStats, BackendError> {
        let bytes = text.as_bytes();
        let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
        let line_count = newlines + usize::from(!bytes.is_empty() && !text.ends_with('\n'));

        if text.is_ascii() {
            return Ok(TextStats {
                char_count: bytes.len(),
                byte_count: bytes.len(),
                line_count,
                cjk_count: 0,
                ascii_count: bytes.len(),
                display_width: bytes.len() as u64,
                has_cjk: false,
            });
        }

        let mut stats = TextStats {
            char_count: 0,
            byte_count: bytes.len(),
            line_count,
            cjk_count: 0,
            ascii_count: 0,
            display_width: 0,
            has_cjk: false,
        };
        for ch in text.chars() {
            stats.char_count += 1;
            stats.display_width += u64::from(longtext_unicode::char_width(ch));
            if (ch as u32) <= longtext_unicode::NARROW_MAX {
                stats.ascii_count += 1;
            } else if longtext_unicode::is_wide_char(ch) {
                stats.cjk_count += 1;
            }
        }
        stats.has_cjk = stats.cjk_count > 0;
        Ok(stats)
    }

    fn is_wide_script(&self, text: &str) -> Result<bool, BackendError> {
        if text.is_ascii() {
            return Ok(false);
        }
        Ok(longtext_unicode::is_wide_script(text))
    }
}
