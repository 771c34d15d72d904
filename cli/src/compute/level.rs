use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use ntcireval::{Judgments, RelevanceScale, SystemSequence, evaluate_with_arrays, read};

use super::{MetricArgs, emit};
use crate::input::{open, open_or_stdin};

#[derive(clap::Args, Debug, serde::Serialize)]
pub struct ComputeArgs {
    /// Relevance file: `<docID> L<n> [<class>]` lines
    #[arg(short, long)]
    pub rel: PathBuf,

    /// Gain per level from L1 up, e.g. `1:2:3`
    #[arg(short, long, env = "NTCIREVAL_GAINS")]
    pub gains: String,

    /// Stop value per level for graded-uniform NCU; defaults to the gains
    #[arg(short, long, env = "NTCIREVAL_STOPS")]
    pub stops: Option<String>,

    /// The third relevance-file field is an equivalence class id
    #[arg(long)]
    pub ec: bool,

    #[command(flatten)]
    pub metric: MetricArgs,

    /// Level-labelled ranking (`<docID> [L<n>]` lines); stdin if omitted
    pub system: Option<PathBuf>,
}

pub fn run(args: ComputeArgs, sep: &str, verbose: bool) -> anyhow::Result<()> {
    let options = args.metric.options()?;
    let scale = RelevanceScale::parse(&args.gains, args.stops.as_deref())?;

    let records = read::level_judgments(open(&args.rel)?, sep)
        .with_context(|| format!("Reading relevance file {}", args.rel.display()))?;
    let judgments = Judgments::from_levels(records, scale, args.ec)?;

    let entries = read::level_labelled(open_or_stdin(args.system.as_deref())?, sep)
        .context("Reading ranked list")?;
    debug!(ranked = entries.len(), "loaded level-labelled ranking");
    let system = SystemSequence::from_labelled(entries, judgments.grading())?;

    let evaluation = evaluate_with_arrays(&judgments, &system, &options)?;
    emit(&evaluation, &args.metric, judgments.grading().scale(), verbose)
}
