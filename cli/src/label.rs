//! `glabel` and `label`: turn a bare ranking into a labelled one that
//! `gcompute` / `compute` accept.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

use ntcireval::scale::MAX_RELEVANCE_LEVEL;
use ntcireval::{Judgments, LabelOptions, RelevanceScale, label_ranking, read};

use crate::input::{open, open_or_stdin};

/// Options common to both labelling commands.
#[derive(clap::Args, Debug, serde::Serialize)]
pub struct LabelFlags {
    /// Drop unjudged documents (write a condensed list)
    #[arg(short = 'j', long)]
    pub condensed: bool,

    /// Stop after this many ranked documents
    #[arg(long)]
    pub truncate: Option<usize>,

    /// Ranking, docID in the first field of each line; stdin if omitted
    pub ranking: Option<PathBuf>,
}

impl LabelFlags {
    fn options(&self) -> LabelOptions {
        LabelOptions {
            condensed: self.condensed,
            truncate: self.truncate,
        }
    }
}

#[derive(clap::Args, Debug, serde::Serialize)]
pub struct GlabelArgs {
    /// Ideal list: `<docID> <gain>` lines
    #[arg(short = 'I', long)]
    pub ideal: PathBuf,

    #[command(flatten)]
    pub flags: LabelFlags,
}

#[derive(clap::Args, Debug, serde::Serialize)]
pub struct LabelArgs {
    /// Relevance file: `<docID> L<n> [<class>]` lines
    #[arg(short, long)]
    pub rel: PathBuf,

    /// Gain per level, only used to bound the accepted levels. Without it
    /// every level up to L15 is accepted
    #[arg(short, long, env = "NTCIREVAL_GAINS")]
    pub gains: Option<String>,

    /// The third relevance-file field is an equivalence class id; later
    /// members of a class already ranked are written unlabelled
    #[arg(long)]
    pub ec: bool,

    #[command(flatten)]
    pub flags: LabelFlags,
}

pub fn glabel(args: GlabelArgs, sep: &str) -> anyhow::Result<()> {
    let records = read::gain_judgments(open(&args.ideal)?, sep)
        .with_context(|| format!("Reading ideal list {}", args.ideal.display()))?;
    let judgments = Judgments::from_gains(records)?;
    write_labelled(&judgments, &args.flags, sep)
}

pub fn label(args: LabelArgs, sep: &str) -> anyhow::Result<()> {
    let scale = match &args.gains {
        Some(gains) => RelevanceScale::parse(gains, None)?,
        None => RelevanceScale::new(vec![1.0; MAX_RELEVANCE_LEVEL], None)?,
    };
    let records = read::level_judgments(open(&args.rel)?, sep)
        .with_context(|| format!("Reading relevance file {}", args.rel.display()))?;
    let judgments = Judgments::from_levels(records, scale, args.ec)?;
    write_labelled(&judgments, &args.flags, sep)
}

fn write_labelled(judgments: &Judgments, flags: &LabelFlags, sep: &str) -> anyhow::Result<()> {
    let ranking = read::ranking(open_or_stdin(flags.ranking.as_deref())?, sep)
        .context("Reading ranked list")?;
    let labelled = label_ranking(ranking, judgments, &flags.options())?;

    let mut out = std::io::stdout().lock();
    for doc in &labelled {
        writeln!(out, "{}", doc.render(sep))?;
    }
    Ok(())
}
