use tracing::debug;

use crate::aggregate::Aggregator;
use crate::cumulative::{CumulativeArrays, PassParams};
use crate::error::{EvalError, Result};
use crate::judgment::{IdealSequence, Judgments};
use crate::options::EvalOptions;
use crate::report::MetricReport;
use crate::system::SystemSequence;

/// A finished evaluation together with the arrays it was reduced from.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub report: MetricReport,
    pub ideal: CumulativeArrays,
    pub system: CumulativeArrays,
}

/// Evaluate one topic.
///
/// `system` must have been built against `judgments.grading()`; a sequence
/// resolved under another grading or scale is rejected. Either a complete
/// report comes back or nothing does.
pub fn evaluate(
    judgments: &Judgments,
    system: &SystemSequence,
    options: &EvalOptions,
) -> Result<MetricReport> {
    Ok(evaluate_with_arrays(judgments, system, options)?.report)
}

/// As [`evaluate`], also handing back the per-rank arrays for diagnostics.
pub fn evaluate_with_arrays(
    judgments: &Judgments,
    system: &SystemSequence,
    options: &EvalOptions,
) -> Result<Evaluation> {
    options.validate()?;
    if system.grading() != judgments.grading() {
        return Err(EvalError::GradingMismatch {
            judgments: judgments.grading().name(),
            system: system.grading().name(),
        });
    }
    let ideal = judgments.ideal();
    check_judgments(ideal, options)?;

    let maxlen = ideal.relevant_count().max(system.len());
    debug!(
        syslen = system.len(),
        jrel = ideal.relevant_count(),
        jnonrel = ideal.nonrelevant_count(),
        maxlen,
        "evaluating topic"
    );

    let params = PassParams::new(options, ideal.highest_gain());
    let ideal_arrays = CumulativeArrays::ideal(ideal, maxlen, &params);
    if let Some(gap) = &ideal_arrays.gap {
        let jrel = ideal.relevant_count();
        for rank in options.cutoffs.iter().map(|&k| k.min(jrel)).chain([jrel]) {
            if !(gap[rank] > 0.0) {
                return Err(EvalError::ZeroGapNormaliser { rank });
            }
        }
    }
    let system_arrays = CumulativeArrays::system(system, &ideal_arrays, maxlen, &params);

    let report = Aggregator {
        ideal,
        system,
        grading: judgments.grading(),
        ideal_arrays: &ideal_arrays,
        system_arrays: &system_arrays,
        options,
    }
    .report();

    Ok(Evaluation {
        report,
        ideal: ideal_arrays,
        system: system_arrays,
    })
}

fn check_judgments(ideal: &IdealSequence, options: &EvalOptions) -> Result<()> {
    if ideal.relevant_count() == 0 {
        return Err(EvalError::NoRelevant);
    }
    if options.condensed && ideal.nonrelevant_count() == 0 {
        return Err(EvalError::NoJudgedNonrelevant);
    }
    if !(ideal.highest_gain() > 0.0) {
        return Err(EvalError::ZeroHighestGain {
            hgain: ideal.highest_gain(),
        });
    }
    Ok(())
}
