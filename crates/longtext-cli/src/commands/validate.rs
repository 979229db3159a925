//! Validate command implementation
//!
//! Exits non-zero with the reason on stderr when the text is rejected.

use crate::{cli::ValidateArgs, input::read_text, orchestrator, Result};
use longtext::LongtextError;

pub async fn run(args: &ValidateArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let orchestrator = orchestrator(args.tiers, None)?;
    let chars = text.chars().count();

    let verdict = orchestrator.validate(text).await;
    orchestrator.shutdown();

    match verdict {
        Ok(()) => {
            println!("valid ({chars} characters)");
            Ok(())
        }
        Err(LongtextError::Validation(e)) => {
            println!("invalid: {}", e.reason());
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
