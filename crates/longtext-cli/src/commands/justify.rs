//! Justify command implementation

use crate::{cli::JustifyArgs, input::read_text, orchestrator, Result};
use longtext::{types::ProgressEvent, ProgressCallback};
use std::sync::Arc;

pub async fn run(args: &JustifyArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let orchestrator = orchestrator(args.tiers, Some(args.layout.into()))?;

    let progress: Option<ProgressCallback> = if args.progress {
        Some(Arc::new(|e: ProgressEvent| {
            eprintln!("[{:>3.0}%] chunk {}/{}", e.progress, e.chunk, e.total);
        }))
    } else {
        None
    };

    let result = match args.chunk_size {
        Some(chunk_size) => {
            orchestrator
                .chunked_justify(text, args.width, chunk_size, progress)
                .await?
        }
        None => orchestrator.justify(text, args.width).await?,
    };
    log::debug!(
        "Justified {} line(s) on the {} tier (accelerated: {})",
        result.lines.len(),
        result.tier_used,
        result.accelerated
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in &result.lines {
            println!("{line}");
        }
    }

    orchestrator.shutdown();
    Ok(())
}
