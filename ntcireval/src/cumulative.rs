//! Per-rank cumulative statistics for the ideal and the system sequence.
//!
//! Every array is indexed by rank, with index 0 holding the value of the
//! empty prefix, and is `maxlen + 1` long where `maxlen = max(R, syslen)`.
//! Past the end of its own sequence an array holds its last value: once a
//! list is exhausted no further gain can accrue.

use tracing::trace;

use crate::judgment::IdealSequence;
use crate::options::EvalOptions;
use crate::system::SystemSequence;

/// Numeric parameters shared by both passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassParams {
    pub log_base: f64,
    pub beta: f64,
    pub rbp_persistence: f64,
    pub rbu_persistence: Option<f64>,
    /// Highest gain; ERR-style probabilities divide by `hgain + 1`
    pub hgain: f64,
    pub compute_gap: bool,
}

impl PassParams {
    pub fn new(options: &EvalOptions, hgain: f64) -> Self {
        Self {
            log_base: options.log_base,
            beta: options.beta,
            rbp_persistence: options.rbp_persistence,
            rbu_persistence: options.rbu_persistence,
            hgain,
            compute_gap: options.compute_gap,
        }
    }
}

/// The "original" DCG discount: no discount up to rank `b`, then
/// `log_b(r)`. A base of zero selects the natural log.
pub fn discount(log_base: f64, rank: usize) -> f64 {
    let r = rank as f64;
    if rank == 1 || r <= log_base {
        1.0
    } else if log_base == 0.0 {
        r.ln()
    } else {
        r.ln() / log_base.ln()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeArrays {
    /// Natural length of the sequence (R for the ideal pass, syslen for
    /// the system pass)
    pub length: usize,
    pub count: Vec<usize>,
    pub gain: Vec<f64>,
    /// Graded-uniform NCU stop value at each rank (system pass, level mode)
    pub stop: Vec<f64>,
    pub cg: Vec<f64>,
    pub dcg: Vec<f64>,
    pub ms_dcg: Vec<f64>,
    /// Blended ratio against the ideal cumulative gain; zero past `length`
    pub br: Vec<f64>,
    pub rbp_sum: Vec<f64>,
    pub err: Vec<f64>,
    /// Probability of not yet being satisfied after each rank
    pub dsat: Vec<f64>,
    pub ebr: Vec<f64>,
    /// Ideal pass: the cumulative GAP normaliser. System pass: the
    /// per-rank pairwise term, nonzero only at relevant ranks.
    pub gap: Option<Vec<f64>>,
    pub irbu: Option<Vec<f64>>,
    rbp_weight: f64,
}

impl CumulativeArrays {
    /// Ideal pass over the relevant prefix of `ideal`.
    pub fn ideal(ideal: &IdealSequence, maxlen: usize, params: &PassParams) -> Self {
        let mut a = Self::start(maxlen, params);
        for doc in ideal.relevant() {
            a.push(params, doc.gain, true, 0.0, None);
            if let Some(gap) = &mut a.gap {
                let g = gap_grade(doc.level, doc.gain);
                let prev = gap[gap.len() - 1];
                gap.push(prev + g * (g + 1.0));
            }
        }
        a.length = ideal.relevant_count();
        a.extend_to(maxlen, true);
        a
    }

    /// System pass. Blended ratios read the ideal pass's cumulative gain, so
    /// `ideal` must come from [`CumulativeArrays::ideal`] with the same
    /// `maxlen`.
    pub fn system(
        system: &SystemSequence,
        ideal: &CumulativeArrays,
        maxlen: usize,
        params: &PassParams,
    ) -> Self {
        let docs = system.docs();
        let grades: Vec<f64> = if params.compute_gap {
            docs.iter().map(|d| gap_grade(d.level, d.gain)).collect()
        } else {
            vec![]
        };

        let mut a = Self::start(maxlen, params);
        for (i, doc) in docs.iter().enumerate() {
            let rank = i + 1;
            a.push(
                params,
                doc.gain,
                doc.is_relevant(),
                doc.stop,
                Some(ideal.cg[rank]),
            );
            if let Some(gap) = &mut a.gap {
                // O(rank): the whole list is quadratic
                let term = if doc.is_relevant() {
                    let x = grades[i];
                    grades[..=i]
                        .iter()
                        .map(|&y| {
                            let m = x.min(y);
                            m * (m + 1.0)
                        })
                        .sum()
                } else {
                    0.0
                };
                gap.push(term);
            }
        }
        a.length = docs.len();
        a.extend_to(maxlen, false);
        a
    }

    /// Highest rank any array covers.
    pub fn maxlen(&self) -> usize {
        self.count.len() - 1
    }

    /// `#<r> CGi= DCGi= msDCGi=` rows for every rank.
    pub fn ideal_rows(&self) -> Vec<String> {
        (1..=self.maxlen())
            .map(|i| {
                format!(
                    "#{i} CGi={:.4} DCGi={:.4} msDCGi={:.4}",
                    self.cg[i], self.dcg[i], self.ms_dcg[i]
                )
            })
            .collect()
    }

    /// `#<r> count= Gs= CGs= DCGs= msDCGs= BR=` rows for ranks with a
    /// positive gain.
    pub fn system_rows(&self) -> Vec<String> {
        (1..=self.length)
            .filter(|&i| self.gain[i] > 0.0)
            .map(|i| {
                format!(
                    "#{i} count={} Gs={:.4} CGs={:.4} DCGs={:.4} msDCGs={:.4} BR={:.4}",
                    self.count[i], self.gain[i], self.cg[i], self.dcg[i], self.ms_dcg[i], self.br[i]
                )
            })
            .collect()
    }

    fn start(maxlen: usize, params: &PassParams) -> Self {
        let seeded = |v: f64| {
            let mut a = Vec::with_capacity(maxlen + 1);
            a.push(v);
            a
        };
        let mut count = Vec::with_capacity(maxlen + 1);
        count.push(0);

        Self {
            length: 0,
            count,
            gain: seeded(0.0),
            stop: seeded(0.0),
            cg: seeded(0.0),
            dcg: seeded(0.0),
            ms_dcg: seeded(0.0),
            br: seeded(0.0),
            rbp_sum: seeded(0.0),
            err: seeded(0.0),
            dsat: seeded(1.0),
            ebr: seeded(0.0),
            gap: params.compute_gap.then(|| seeded(0.0)),
            irbu: params.rbu_persistence.map(|_| seeded(0.0)),
            rbp_weight: 1.0,
        }
    }

    /// Append the next rank. `ideal_cg` is the ideal cumulative gain at this
    /// rank; the ideal pass blends against itself.
    fn push(
        &mut self,
        params: &PassParams,
        gain: f64,
        relevant: bool,
        stop: f64,
        ideal_cg: Option<f64>,
    ) {
        let rank = self.count.len();
        let prev = rank - 1;
        let r = rank as f64;

        let count = self.count[prev] + usize::from(relevant);
        let cg = self.cg[prev] + gain;
        let dcg = self.dcg[prev] + gain / discount(params.log_base, rank);
        let ms_dcg = self.ms_dcg[prev] + gain / (r + 1.0).ln();
        let br = (params.beta * cg + count as f64) / (params.beta * ideal_cg.unwrap_or(cg) + r);

        if rank > 1 {
            self.rbp_weight *= params.rbp_persistence;
        }
        let rbp_sum = self.rbp_sum[prev] + gain * self.rbp_weight;

        let p_stop = gain / (params.hgain + 1.0);
        let dsat_prev = self.dsat[prev];
        let err = self.err[prev] + (dsat_prev / r) * p_stop;
        let ebr = self.ebr[prev] + br * dsat_prev * p_stop;

        if let (Some(irbu), Some(p)) = (&mut self.irbu, params.rbu_persistence) {
            irbu.push(irbu[prev] + p.powi(rank as i32) * dsat_prev * p_stop);
        }

        trace!(rank, count, gain, cg, dcg, br, err, "accumulated rank");

        self.count.push(count);
        self.gain.push(gain);
        self.stop.push(stop);
        self.cg.push(cg);
        self.dcg.push(dcg);
        self.ms_dcg.push(ms_dcg);
        self.br.push(br);
        self.rbp_sum.push(rbp_sum);
        self.err.push(err);
        self.dsat.push(dsat_prev * (1.0 - p_stop));
        self.ebr.push(ebr);
    }

    fn extend_to(&mut self, maxlen: usize, hold_gap: bool) {
        let n = maxlen + 1;
        hold(&mut self.count, n);
        hold(&mut self.cg, n);
        hold(&mut self.dcg, n);
        hold(&mut self.ms_dcg, n);
        hold(&mut self.rbp_sum, n);
        hold(&mut self.err, n);
        hold(&mut self.dsat, n);
        hold(&mut self.ebr, n);
        if let Some(irbu) = &mut self.irbu {
            hold(irbu, n);
        }
        if let Some(gap) = &mut self.gap {
            if hold_gap {
                hold(gap, n);
            } else {
                gap.resize(n, 0.0);
            }
        }
        self.gain.resize(n, 0.0);
        self.stop.resize(n, 0.0);
        self.br.resize(n, 0.0);
    }
}

/// GAP compares relevance levels in level mode and gains in gain mode.
fn gap_grade(level: Option<usize>, gain: f64) -> f64 {
    level.map_or(gain, |l| l as f64)
}

fn hold<T: Copy>(values: &mut Vec<T>, len: usize) {
    if let Some(&last) = values.last() {
        values.resize(len, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::{GainRecord, Grade, Grading, Judgments};
    use crate::options::EvalOptionsBuilder;
    use crate::system::SystemEntry;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    fn scenario(options: &EvalOptions) -> (CumulativeArrays, CumulativeArrays) {
        let judgments = Judgments::from_gains(
            [("A", 3.0), ("B", 2.0), ("C", 0.0)].map(|(d, gain)| GainRecord {
                doc_id: d.into(),
                gain,
            }),
        )
        .unwrap();
        let system = SystemSequence::from_labelled(
            [
                SystemEntry::new("B", Some(Grade::Gain(2.0))),
                SystemEntry::new("X", None),
                SystemEntry::new("A", Some(Grade::Gain(3.0))),
                SystemEntry::new("C", Some(Grade::Gain(0.0))),
            ],
            &Grading::Gain,
        )
        .unwrap();
        let params = PassParams::new(options, judgments.ideal().highest_gain());
        let maxlen = judgments.ideal().relevant_count().max(system.len());
        let ideal = CumulativeArrays::ideal(judgments.ideal(), maxlen, &params);
        let sys = CumulativeArrays::system(&system, &ideal, maxlen, &params);
        (ideal, sys)
    }

    #[test]
    fn discount_leaves_ranks_up_to_the_base_alone() {
        assert_eq!(discount(2.0, 1), 1.0);
        assert_eq!(discount(2.0, 2), 1.0);
        assert!(close(discount(2.0, 4), 2.0));
        assert_eq!(discount(10.0, 7), 1.0);
        assert!(close(discount(0.0, 3), 3f64.ln()));
        // natural log never skips rank 2
        assert!(close(discount(0.0, 2), 2f64.ln()));
    }

    #[test]
    fn ideal_pass_holds_its_tail() {
        let (ideal, _) = scenario(&EvalOptions::default());
        assert_eq!(ideal.length, 2);
        assert_eq!(ideal.maxlen(), 4);
        assert_eq!(ideal.dcg[1..], [3.0, 5.0, 5.0, 5.0]);
        assert_eq!(ideal.cg[1..], [3.0, 5.0, 5.0, 5.0]);
        assert!(close(ideal.err[4], 0.8125));
    }

    #[test]
    fn system_pass_matches_hand_computation() {
        let (_, sys) = scenario(&EvalOptions::default());
        assert_eq!(sys.count[1..], [1, 1, 2, 2]);
        assert_eq!(sys.cg[1..], [2.0, 2.0, 5.0, 5.0]);
        assert!(close(sys.dcg[3], 3.8928));
        assert!(close(sys.dcg[4], 3.8928));
        assert!(close(sys.br[1], 0.75));
        assert!(close(sys.br[3], 0.875));
        assert!(close(sys.err[4], 0.625));
        assert!(close(sys.dsat[3], 0.125));
        assert!(close(sys.ebr[4], 0.703125));
        assert!(close(sys.rbp_sum[4], 2.0 + 3.0 * 0.95 * 0.95));
        assert!(sys.gap.is_none());
        assert!(sys.irbu.is_none());
    }

    #[test]
    fn system_shorter_than_ideal_freezes() {
        let judgments = Judgments::from_gains(
            [("A", 1.0), ("B", 1.0), ("C", 1.0)].map(|(d, gain)| GainRecord {
                doc_id: d.into(),
                gain,
            }),
        )
        .unwrap();
        let system = SystemSequence::from_labelled(
            [SystemEntry::new("A", Some(Grade::Gain(1.0)))],
            &Grading::Gain,
        )
        .unwrap();
        let options = EvalOptionsBuilder::default()
            .rbu_persistence(0.5)
            .build()
            .unwrap();
        let params = PassParams::new(&options, 1.0);
        let ideal = CumulativeArrays::ideal(judgments.ideal(), 3, &params);
        let sys = CumulativeArrays::system(&system, &ideal, 3, &params);
        assert_eq!(sys.count[1..], [1, 1, 1]);
        assert_eq!(sys.err[3], sys.err[1]);
        assert_eq!(sys.ebr[3], sys.ebr[1]);
        let irbu = sys.irbu.as_ref().unwrap();
        assert!(close(irbu[1], 0.5 * 0.5));
        assert_eq!(irbu[3], irbu[1]);
        // blended ratio is not extended
        assert_eq!(sys.br[2], 0.0);
    }

    #[test]
    fn gap_terms() {
        let options = EvalOptionsBuilder::default().compute_gap(true).build().unwrap();
        let (ideal, sys) = scenario(&options);
        let gi = ideal.gap.unwrap();
        assert_eq!(gi[1..], [12.0, 18.0, 18.0, 18.0]);
        let gs = sys.gap.unwrap();
        assert_eq!(gs[1..], [6.0, 0.0, 18.0, 0.0]);
    }

    #[test]
    fn verbose_rows() {
        let (ideal, sys) = scenario(&EvalOptions::default());
        assert_eq!(ideal.ideal_rows()[0], "#1 CGi=3.0000 DCGi=3.0000 msDCGi=4.3281");
        let rows = sys.system_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with("#3 count=2 Gs=3.0000 CGs=5.0000 DCGs=3.8928"));
    }
}
