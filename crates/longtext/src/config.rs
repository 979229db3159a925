//! Orchestrator configuration
//!
//! Defaults suit an interactive caller: a short window for the worker to come
//! up, a generous one for each request. Three environment variables can
//! override them at startup:
//!
//! ```bash
//! LONGTEXT_OFFLOAD=0 LONGTEXT_NATIVE=off LONGTEXT_REQUEST_TIMEOUT_MS=5000 ./my_app
//! ```

use longtext_core::{types::LayoutOptions, LongtextError, Result};
use std::time::Duration;

/// How long the worker gets to report readiness
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a dispatched request may wait for its terminal message
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `justify` inputs longer than this (in characters) go through the chunk processor
pub const DEFAULT_AUTO_CHUNK_THRESHOLD: usize = 100_000;

/// Chunk size used when chunking kicks in automatically
pub const DEFAULT_AUTO_CHUNK_SIZE: usize = 10_000;

pub const ENV_OFFLOAD: &str = "LONGTEXT_OFFLOAD";
pub const ENV_NATIVE: &str = "LONGTEXT_NATIVE";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "LONGTEXT_REQUEST_TIMEOUT_MS";

/// Everything an [`Orchestrator`](crate::Orchestrator) needs to know up front
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Whether the offloaded worker may be started at all
    pub offload: bool,
    /// Whether the accelerated native module may be loaded
    pub native: bool,
    pub init_timeout: Duration,
    pub request_timeout: Duration,
    pub auto_chunk_threshold: usize,
    pub auto_chunk_size: usize,
    /// Used to place justified lines in every [`JustifyResult`](longtext_core::types::JustifyResult)
    pub layout: LayoutOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            offload: true,
            native: true,
            init_timeout: DEFAULT_INIT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auto_chunk_threshold: DEFAULT_AUTO_CHUNK_THRESHOLD,
            auto_chunk_size: DEFAULT_AUTO_CHUNK_SIZE,
            layout: LayoutOptions::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Defaults overlaid with the `LONGTEXT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_OFFLOAD) {
            config.offload = parse_switch(ENV_OFFLOAD, &value)?;
            log::info!("Offloading {} via {}", on_off(config.offload), ENV_OFFLOAD);
        }
        if let Some(value) = lookup(ENV_NATIVE) {
            config.native = parse_switch(ENV_NATIVE, &value)?;
            log::info!("Native module {} via {}", on_off(config.native), ENV_NATIVE);
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            let ms: u64 = value.trim().parse().map_err(|_| {
                LongtextError::Config(format!(
                    "{ENV_REQUEST_TIMEOUT_MS} must be a number of milliseconds, got {value:?}"
                ))
            })?;
            config.request_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.init_timeout.is_zero() {
            return Err(LongtextError::Config("init_timeout must be positive".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(LongtextError::Config(
                "request_timeout must be positive".into(),
            ));
        }
        if self.auto_chunk_size == 0 {
            return Err(LongtextError::Config(
                "auto_chunk_size must be positive".into(),
            ));
        }
        if self.layout.font_size <= 0.0 {
            return Err(LongtextError::Config("font_size must be positive".into()));
        }
        Ok(())
    }
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LongtextError::Config(format!(
            "{key} must be one of 1/0, true/false, yes/no, on/off, got {other:?}"
        ))),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
