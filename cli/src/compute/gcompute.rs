use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use ntcireval::{Judgments, SystemSequence, evaluate_with_arrays, read};

use super::{MetricArgs, emit};
use crate::input::{open, open_or_stdin};

#[derive(clap::Args, Debug, serde::Serialize)]
pub struct GcomputeArgs {
    /// Ideal list: `<docID> <gain>` lines, highest gain first
    #[arg(short = 'I', long)]
    pub ideal: PathBuf,

    #[command(flatten)]
    pub metric: MetricArgs,

    /// Gain-labelled ranking (`<docID> [<gain>]` lines); stdin if omitted
    pub system: Option<PathBuf>,
}

pub fn run(args: GcomputeArgs, sep: &str, verbose: bool) -> anyhow::Result<()> {
    let options = args.metric.options()?;

    let records = read::gain_judgments(open(&args.ideal)?, sep)
        .with_context(|| format!("Reading ideal list {}", args.ideal.display()))?;
    let judgments = Judgments::from_gains(records)?;

    let entries = read::gain_labelled(open_or_stdin(args.system.as_deref())?, sep, options.condensed)
        .context("Reading ranked list")?;
    debug!(ranked = entries.len(), "loaded gain-labelled ranking");
    let system = SystemSequence::from_labelled(entries, judgments.grading())?;

    let evaluation = evaluate_with_arrays(&judgments, &system, &options)?;
    emit(&evaluation, &args.metric, None, verbose)
}
