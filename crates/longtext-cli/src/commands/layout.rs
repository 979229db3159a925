//! Layout command implementation
//!
//! Places already-broken lines on a canvas without justifying them.

use crate::{cli::LayoutArgs, input::read_text, Result};
use longtext::compute_line_positions;

pub fn run(args: &LayoutArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let lines: Vec<&str> = text.lines().collect();
    let positions = compute_line_positions(&lines, &args.layout.into());

    println!("{}", serde_json::to_string_pretty(&positions)?);
    Ok(())
}
