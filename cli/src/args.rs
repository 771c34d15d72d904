use clap::{Parser, Subcommand};

use crate::compute::{gcompute::GcomputeArgs, level::ComputeArgs};
use crate::label::{GlabelArgs, LabelArgs};

/// Single-topic retrieval evaluation
#[derive(Parser, Debug, serde::Serialize)]
#[command(version, about, long_about = None)]
pub struct FullArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr; `gcompute`/`compute` also dump per-rank rows
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Field separator for every input and output file. Each character of
    /// the string separates fields
    #[arg(long, global = true, default_value = " ", env = "NTCIREVAL_SEP")]
    pub sep: String,
}

#[derive(Subcommand, Debug, serde::Serialize)]
pub enum Commands {
    /// Evaluate a gain-labelled ranking against an ideal list of gains
    Gcompute(GcomputeArgs),
    /// Evaluate an L<n>-labelled ranking against a relevance file
    Compute(ComputeArgs),
    /// Attach gains from an ideal list to a bare ranking
    Glabel(GlabelArgs),
    /// Attach L<n> levels from a relevance file to a bare ranking
    Label(LabelArgs),
}
