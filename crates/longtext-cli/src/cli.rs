//! CLI argument definitions using Clap v4

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Longtext - justify very long texts into fixed-width lines
#[derive(Parser, Debug)]
#[command(name = "longtext")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Justify text to a width budget
    #[command(alias = "j")]
    Justify(JustifyArgs),

    /// Print statistics about a text
    Stats(StatsArgs),

    /// Check a text against the input limits
    Validate(ValidateArgs),

    /// Compute canvas positions for lines of text
    Layout(LayoutArgs),

    /// Justify many texts from a JSONL file
    Batch(BatchArgs),

    /// Show available tiers and limits
    #[command(alias = "i")]
    Info(InfoArgs),
}

/// Where the text comes from
#[derive(Args, Debug, Default)]
pub struct TextInput {
    /// Input text (reads from stdin if omitted)
    pub text: Option<String>,

    /// Read input text from file
    #[arg(short = 'T', long = "text-file", conflicts_with = "text")]
    pub text_file: Option<PathBuf>,
}

/// Which execution tiers may be used
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct TierArgs {
    /// Compute in-process instead of on the worker thread
    #[arg(long = "no-offload")]
    pub no_offload: bool,

    /// Skip the accelerated native module
    #[arg(long = "no-native")]
    pub no_native: bool,
}

/// Canvas placement of justified lines
#[derive(Args, Debug, Clone, Copy)]
pub struct LayoutOptionsArgs {
    /// Font size in pixels
    #[arg(long = "font-size", default_value = "16")]
    pub font_size: f32,

    /// Padding around the text in pixels
    #[arg(long = "padding", default_value = "20")]
    pub padding: f32,
}

#[derive(Args, Debug)]
pub struct JustifyArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Width budget per line (wide characters count double)
    #[arg(short = 'w', long = "width", default_value = "80")]
    pub width: u32,

    /// Justify in independent chunks of this many characters
    #[arg(short = 'c', long = "chunk-size")]
    pub chunk_size: Option<usize>,

    /// Print the full result (lines, positions, tier) as JSON
    #[arg(long)]
    pub json: bool,

    /// Report chunk progress on stderr
    #[arg(long)]
    pub progress: bool,

    #[command(flatten)]
    pub layout: LayoutOptionsArgs,

    #[command(flatten)]
    pub tiers: TierArgs,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub tiers: TierArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: TextInput,

    #[command(flatten)]
    pub tiers: TierArgs,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Lines to place, one per input line
    #[command(flatten)]
    pub input: TextInput,

    #[command(flatten)]
    pub layout: LayoutOptionsArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input JSONL file (reads from stdin if omitted)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Width used by jobs that do not set their own
    #[arg(short = 'w', long = "width", default_value = "80")]
    pub width: u32,

    /// Suppress the summary on stderr
    #[arg(short = 'q', long)]
    pub quiet: bool,

    #[command(flatten)]
    pub tiers: TierArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub tiers: TierArgs,
}
