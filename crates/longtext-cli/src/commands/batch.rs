//! Batch command implementation
//!
//! Reads one job per line, `{"text": "...", "width": 40, "chunkSize": 1000}`
//! with `width` and `chunkSize` optional, and writes one JSON result per job
//! in the same order. A bad job produces an error line and does not stop the
//! batch.

use crate::{cli::BatchArgs, orchestrator, CliError, Result};
use longtext::{types::JustifyResult, Orchestrator};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

/// JSONL job specification
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchJob {
    text: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    chunk_size: Option<usize>,
}

/// One output line
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum JobOutcome {
    Done {
        line: usize,
        #[serde(flatten)]
        result: JustifyResult,
    },
    Failed {
        line: usize,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<&'static str>,
    },
}

pub async fn run(args: &BatchArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let orchestrator = orchestrator(args.tiers, None)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut done = 0usize;
    let mut failed = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match run_job(&orchestrator, &line, args.width).await {
            Ok(result) => {
                done += 1;
                JobOutcome::Done {
                    line: idx + 1,
                    result,
                }
            }
            Err(e) => {
                failed += 1;
                log::warn!("Job on line {} failed: {e}", idx + 1);
                JobOutcome::Failed {
                    line: idx + 1,
                    reason: match &e {
                        CliError::Longtext(longtext::LongtextError::Validation(v)) => {
                            Some(v.reason())
                        }
                        _ => None,
                    },
                    error: e.to_string(),
                }
            }
        };

        writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
    }

    orchestrator.shutdown();

    if !args.quiet {
        eprintln!("Processed {} job(s): {done} succeeded, {failed} failed", done + failed);
    }
    Ok(())
}

async fn run_job(orchestrator: &Orchestrator, line: &str, default_width: u32) -> Result<JustifyResult> {
    let job: BatchJob = serde_json::from_str(line)
        .map_err(|e| CliError::Usage(format!("invalid job: {e}")))?;
    let width = job.width.unwrap_or(default_width);

    let result = match job.chunk_size {
        Some(chunk_size) => {
            orchestrator
                .chunked_justify(job.text, width, chunk_size, None)
                .await?
        }
        None => orchestrator.justify(job.text, width).await?,
    };
    Ok(result)
}
