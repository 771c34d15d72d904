pub mod gcompute;
pub mod level;

use std::io::Write;

use ntcireval::options::{DEFAULT_BETA, DEFAULT_GAMMA, DEFAULT_LOG_BASE, DEFAULT_RBP};
use ntcireval::{EvalOptions, EvalOptionsBuilder, Evaluation, RelevanceScale};

/// Metric parameters shared by `gcompute` and `compute`.
#[derive(clap::Args, Debug, serde::Serialize)]
pub struct MetricArgs {
    /// The ranking is a condensed list (unjudged documents removed); adds
    /// bpref and rpref
    #[arg(short = 'j', long)]
    pub condensed: bool,

    /// Q-measure beta
    #[arg(long, default_value_t = DEFAULT_BETA, env = "NTCIREVAL_BETA")]
    pub beta: f64,

    /// Rank-biased NCU gamma
    #[arg(long, default_value_t = DEFAULT_GAMMA, env = "NTCIREVAL_GAMMA")]
    pub gamma: f64,

    /// Log base of the Jarvelin/Kekalainen DCG discount; 0 means natural log
    #[arg(long, default_value_t = DEFAULT_LOG_BASE, env = "NTCIREVAL_LOGB")]
    pub logb: f64,

    /// RBP persistence
    #[arg(long, default_value_t = DEFAULT_RBP, env = "NTCIREVAL_RBP")]
    pub rbp: f64,

    /// Intentwise RBU persistence; iRBU is reported only when set
    #[arg(long, env = "NTCIREVAL_RBUP")]
    pub rbup: Option<f64>,

    /// Report Robertson GAP
    #[arg(long)]
    pub gap: bool,

    /// Comma-separated cutoff ranks (at most 9)
    #[arg(long, default_value = "1000", value_delimiter = ',', env = "NTCIREVAL_CUTOFFS")]
    pub cutoffs: Vec<usize>,

    /// Prefix for every output line, usually the topic id
    #[arg(long, default_value = "")]
    pub out: String,

    /// Print the report as JSON instead of text lines
    #[arg(long)]
    pub json: bool,
}

impl MetricArgs {
    pub fn options(&self) -> anyhow::Result<EvalOptions> {
        let mut builder = EvalOptionsBuilder::default();
        builder
            .condensed(self.condensed)
            .beta(self.beta)
            .gamma(self.gamma)
            .log_base(self.logb)
            .rbp_persistence(self.rbp)
            .compute_gap(self.gap)
            .cutoffs(self.cutoffs.clone());
        if let Some(p) = self.rbup {
            builder.rbu_persistence(p);
        }
        let options = builder.build()?;
        options.validate()?;
        Ok(options)
    }
}

/// Write the report to stdout. With `verbose`, a level scale's gain and stop
/// table comes first and the per-rank rows go between the summary line and
/// the positions line.
pub fn emit(
    evaluation: &Evaluation,
    args: &MetricArgs,
    scale: Option<&RelevanceScale>,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    let report = &evaluation.report;

    if args.json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    if verbose && let Some(scale) = scale {
        for row in scale_rows(scale) {
            writeln!(out, "{row}")?;
        }
    }
    writeln!(out, "{}", report.summary_line(&args.out))?;
    if verbose {
        for row in evaluation
            .ideal
            .ideal_rows()
            .into_iter()
            .chain(evaluation.system.system_rows())
        {
            writeln!(out, "{row}")?;
        }
    }
    writeln!(out, "{}", report.positions_line(&args.out))?;
    for line in report.metric_lines(&args.out) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// `# gain[ l ]= stop[ l ]=` for every level from L0 up.
fn scale_rows(scale: &RelevanceScale) -> Vec<String> {
    (0..=scale.max_level())
        .map(|l| format!("# gain[ {l} ]={:.6} stop[ {l} ]={:.6}", scale.gain(l), scale.stop(l)))
        .collect()
}
