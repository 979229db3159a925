//! Stats command implementation

use crate::{cli::StatsArgs, input::read_text, orchestrator, Result};

pub async fn run(args: &StatsArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let orchestrator = orchestrator(args.tiers, None)?;
    let stats = orchestrator.stats(text).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Characters:     {}", stats.char_count);
        println!("Bytes:          {}", stats.byte_count);
        println!("Lines:          {}", stats.line_count);
        println!("CJK characters: {}", stats.cjk_count);
        println!("ASCII/Latin-1:  {}", stats.ascii_count);
        println!("Display width:  {}", stats.display_width);
        println!("Has CJK:        {}", if stats.has_cjk { "yes" } else { "no" });
    }

    orchestrator.shutdown();
    Ok(())
}
