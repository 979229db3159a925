//! Native-first dispatch of the primitives
//!
//! Both execution tiers compute through a [`Kernel`]: ask the native module,
//! and if it declines or fails, log it and run the pure implementation. The
//! caller never learns about the native failure, only whether the native path
//! produced the value.

use crate::protocol::{Output, Request};
use longtext_core::{
    traits::Verdict,
    types::{ProgressEvent, TextStats},
    BackendError, NativeModule,
};
use std::sync::Arc;

/// A value plus whether the native module computed it
#[derive(Debug, Clone, PartialEq)]
pub struct Computed<T> {
    pub value: T,
    pub accelerated: bool,
}

impl<T> Computed<T> {
    fn native(value: T) -> Self {
        Self {
            value,
            accelerated: true,
        }
    }

    fn pure(value: T) -> Self {
        Self {
            value,
            accelerated: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Computed<U> {
        Computed {
            value: f(self.value),
            accelerated: self.accelerated,
        }
    }
}

#[derive(Clone, Default)]
pub struct Kernel {
    native: Option<Arc<dyn NativeModule>>,
}

impl Kernel {
    pub fn new(native: Option<Arc<dyn NativeModule>>) -> Self {
        Self { native }
    }

    /// Pure implementation only
    pub fn pure() -> Self {
        Self::default()
    }

    pub fn native_name(&self) -> Option<&'static str> {
        self.native.as_ref().map(|m| m.name())
    }

    fn attempt<T>(
        &self,
        op: &str,
        call: impl FnOnce(&dyn NativeModule) -> Result<T, BackendError>,
    ) -> Option<T> {
        let module = self.native.as_deref()?;
        match call(module) {
            Ok(value) => Some(value),
            Err(BackendError::Unsupported(reason)) => {
                log::debug!("{} declined {op}: {reason}", module.name());
                None
            }
            Err(e) => {
                log::warn!("{} failed {op}, using pure implementation: {e}", module.name());
                None
            }
        }
    }

    pub fn justify(&self, text: &str, budget: u32) -> Computed<String> {
        match self.attempt("justify", |m| m.justify(text, budget)) {
            Some(out) => Computed::native(out),
            None => Computed::pure(longtext_justify::justify(text, budget)),
        }
    }

    pub fn chunked_justify(
        &self,
        text: &str,
        budget: u32,
        chunk_size: usize,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Computed<String> {
        let native = self.attempt("chunkedJustify", |m| {
            m.chunked_justify(text, budget, chunk_size, &mut *progress)
        });
        match native {
            Some(out) => Computed::native(out),
            None => Computed::pure(longtext_justify::chunked_justify(
                text,
                budget,
                chunk_size,
                |e| progress(e),
            )),
        }
    }

    /// One justify per text; accelerated only if every text was
    pub fn batch_justify(
        &self,
        texts: &[String],
        budget: u32,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Computed<Vec<String>> {
        let total = texts.len();
        let mut accelerated = total > 0;
        let mut results = Vec::with_capacity(total);

        for (idx, text) in texts.iter().enumerate() {
            let out = self.justify(text, budget);
            accelerated &= out.accelerated;
            results.push(out.value);
            progress(ProgressEvent::new(idx + 1, total));
        }

        Computed {
            value: results,
            accelerated,
        }
    }

    pub fn validate(&self, text: &str) -> Computed<Verdict> {
        match self.attempt("validate", |m| m.validate(text)) {
            Some(verdict) => Computed::native(verdict),
            None => Computed::pure(longtext_justify::validate(text)),
        }
    }

    pub fn stats(&self, text: &str) -> Computed<TextStats> {
        match self.attempt("stats", |m| m.stats(text)) {
            Some(stats) => Computed::native(stats),
            None => Computed::pure(longtext_justify::stats(text)),
        }
    }

    pub fn is_wide_script(&self, text: &str) -> Computed<bool> {
        match self.attempt("isWideScript", |m| m.is_wide_script(text)) {
            Some(wide) => Computed::native(wide),
            None => Computed::pure(longtext_unicode::is_wide_script(text)),
        }
    }

    /// Run any request to completion on the current thread
    pub fn execute(
        &self,
        request: &Request,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Computed<Output> {
        match request {
            Request::Justify(p) => self
                .justify(&p.text, p.max_chars_per_line)
                .map(|text| Output::Justified {
                    text,
                    chunked: false,
                }),
            Request::ChunkedJustify(p) => self
                .chunked_justify(&p.text, p.max_chars_per_line, p.chunk_size, progress)
                .map(|text| Output::Justified {
                    text,
                    chunked: true,
                }),
            Request::BatchJustify(p) => self
                .batch_justify(&p.texts, p.max_chars_per_line, progress)
                .map(Output::Batch),
            Request::Validate(p) => self.validate(&p.text).map(Output::Validated),
            Request::Stats(p) => self.stats(&p.text).map(Output::Stats),
            Request::IsWideScript(p) => self.is_wide_script(&p.text).map(Output::WideScript),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl NativeModule for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn justify(&self, _: &str, _: u32) -> Result<String, BackendError> {
            Err(BackendError::Failed("segfault averted".into()))
        }
        fn chunked_justify(
            &self,
            _: &str,
            _: u32,
            _: usize,
            _: &mut dyn FnMut(ProgressEvent),
        ) -> Result<String, BackendError> {
            Err(BackendError::Failed("segfault averted".into()))
        }
        fn validate(&self, _: &str) -> Result<Verdict, BackendError> {
            Err(BackendError::Unavailable("gone".into()))
        }
        fn stats(&self, _: &str) -> Result<TextStats, BackendError> {
            Err(BackendError::Unavailable("gone".into()))
        }
        fn is_wide_script(&self, _: &str) -> Result<bool, BackendError> {
            Ok(true)
        }
    }

    #[test]
    fn test_pure_kernel() {
        let kernel = Kernel::pure();
        let out = kernel.justify("这是一个测试文本", 10);
        assert_eq!(out.value, "这是一个测\r\n试文本");
        assert!(!out.accelerated);
        assert_eq!(kernel.native_name(), None);
    }

    #[test]
    fn test_native_failures_fall_through() {
        let kernel = Kernel::new(Some(Arc::new(Broken)));
        let out = kernel.justify("Hello World", 5);
        assert_eq!(out.value, "Hello\r\nWorld");
        assert!(!out.accelerated);

        let mut events = Vec::new();
        let out = kernel.chunked_justify("abc def", 10, 5, &mut |e| events.push(e));
        assert_eq!(out.value, "abc d\r\nef");
        assert_eq!(events.len(), 2);

        assert_eq!(kernel.validate("").value, Err(longtext_core::ValidationError::Empty));
        assert_eq!(kernel.stats("ab").value.char_count, 2);

        // A module that answers is trusted
        let wide = kernel.is_wide_script("plain");
        assert!(wide.value);
        assert!(wide.accelerated);
    }

    #[test]
    fn test_batch_progress() {
        let kernel = Kernel::pure();
        let mut events = Vec::new();
        let texts = vec!["a b".to_string(), "c".to_string()];
        let out = kernel.batch_justify(&texts, 1, &mut |e| events.push(e));
        assert_eq!(out.value, vec!["a\r\nb".to_string(), "c".to_string()]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].chunk, 1);
        assert_eq!(events[1].progress, 100.0);
    }

    #[test]
    fn test_execute_marks_chunked() {
        let kernel = Kernel::pure();
        let out = kernel.execute(&Request::chunked_justify("Line1\nLine2", 50, 100), &mut |_| {});
        assert_eq!(
            out.value,
            Output::Justified {
                text: "Line1\r\nLine2".into(),
                chunked: true
            }
        );
    }

    #[cfg(feature = "accel")]
    #[test]
    fn test_accel_kernel_reports_acceleration() {
        let module = longtext_accel::AccelModule::load().unwrap();
        let kernel = Kernel::new(Some(Arc::new(module)));
        assert!(kernel.justify("Hello World", 20).accelerated);
        // Non-ASCII is declined and computed purely
        let wide = kernel.justify("这是一个测试文本", 10);
        assert!(!wide.accelerated);
        assert_eq!(wide.value, "这是一个测\r\n试文本");
    }
}
