//! Info command implementation
//!
//! Starts an orchestrator the way the other commands would and reports where
//! it settled.

use crate::{cli::InfoArgs, orchestrator, Result};
use longtext::{BackendState, MAX_TEXT_LENGTH};

pub async fn run(args: &InfoArgs) -> Result<()> {
    let orchestrator = orchestrator(args.tiers, None)?;
    let state = orchestrator.settle().await;
    let native = orchestrator.native_module().await;
    let config = orchestrator.config();

    println!("Longtext v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Tiers:");
    let offloaded = match state {
        BackendState::Ready => "ready",
        _ if !config.offload => "disabled",
        _ => "unavailable",
    };
    println!("  offloaded         - worker thread ({offloaded})");
    println!("  fallback          - in-process (always available)");
    match native {
        Some(name) => println!("  native            - {name}"),
        None => println!("  native            - none (pure implementation only)"),
    }
    println!();

    println!("State:              {state}");
    println!();

    println!("Limits:");
    println!("  max text length   - {MAX_TEXT_LENGTH} characters");
    println!("  request timeout   - {:?}", config.request_timeout);
    println!(
        "  auto chunking     - above {} characters, {} per chunk",
        config.auto_chunk_threshold, config.auto_chunk_size
    );

    orchestrator.shutdown();
    Ok(())
}
