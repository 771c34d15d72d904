//! Reduce the cumulative arrays to whole-list and cutoff metrics.
//!
//! Every denominator is assumed positive; the pipeline checks the
//! preconditions (R > 0, N > 0 for condensed lists, hgain > 0, a positive
//! GAP normaliser) before calling in here.

use crate::cumulative::CumulativeArrays;
use crate::judgment::{Grading, IdealSequence};
use crate::options::EvalOptions;
use crate::report::MetricReport;
use crate::system::SystemSequence;

pub struct Aggregator<'a> {
    pub ideal: &'a IdealSequence,
    pub system: &'a SystemSequence,
    pub grading: &'a Grading,
    pub ideal_arrays: &'a CumulativeArrays,
    pub system_arrays: &'a CumulativeArrays,
    pub options: &'a EvalOptions,
}

impl Aggregator<'_> {
    pub fn report(&self) -> MetricReport {
        let mut report = MetricReport::new(
            self.system.len(),
            self.ideal.relevant_count(),
            self.ideal.nonrelevant_count(),
            self.system.first_relevant(),
            self.system.preferred(),
        );

        self.early_precision(&mut report);
        self.average_precision(&mut report);
        if let Grading::Level(_) = self.grading {
            self.graded_uniform_ncu(&mut report);
        }
        self.rank_biased_ncu(&mut report);
        if self.options.compute_gap {
            report.push("GAP", None, self.gap(self.syslen(), self.jrel()));
        }
        self.whole_list(&mut report);
        for &k in &self.options.cutoffs {
            self.at_cutoff(&mut report, k);
        }
        if self.options.condensed {
            self.bpref(&mut report);
            self.rpref(&mut report);
        }
        report
    }

    fn syslen(&self) -> usize {
        self.system.len()
    }

    fn jrel(&self) -> usize {
        self.ideal.relevant_count()
    }

    fn hgain(&self) -> f64 {
        self.ideal.highest_gain()
    }

    /// Ranks `1..=upto` whose document carries a positive gain.
    fn gained_ranks(&self, upto: usize) -> impl Iterator<Item = usize> + '_ {
        let gain = &self.system_arrays.gain;
        (1..=upto).filter(move |&i| gain[i] > 0.0)
    }

    fn precision_at(&self, i: usize) -> f64 {
        self.system_arrays.count[i] as f64 / i as f64
    }

    /// RR, O-measure, P-measure and P-plus
    fn early_precision(&self, report: &mut MetricReport) {
        let s = self.system_arrays;
        let r1 = self.system.first_relevant();
        let rp = self.system.preferred();

        let (rr, o, p, p_plus) = if r1 == 0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let sum: f64 = self.gained_ranks(rp).map(|i| s.br[i]).sum();
            (1.0 / r1 as f64, s.br[r1], s.br[rp], sum / s.count[rp] as f64)
        };

        report.push("RR", None, rr);
        report.push("O-measure", None, o);
        report.push("P-measure", None, p);
        report.push("P-plus", None, p_plus);
    }

    fn ap_q_sums(&self, upto: usize) -> (f64, f64) {
        self.gained_ranks(upto).fold((0.0, 0.0), |(ap, q), i| {
            (ap + self.precision_at(i), q + self.system_arrays.br[i])
        })
    }

    fn average_precision(&self, report: &mut MetricReport) {
        let (ap, q) = self.ap_q_sums(self.syslen());
        let r = self.jrel() as f64;
        report.push("AP", None, ap / r);
        report.push("Q-measure", None, q / r);
    }

    fn graded_uniform_ncu(&self, report: &mut MetricReport) {
        let (Some(scale), Some(level_counts)) = (self.grading.scale(), self.ideal.level_counts())
        else {
            return;
        };
        let denom: f64 = level_counts
            .iter()
            .enumerate()
            .skip(1)
            .map(|(l, &n)| n as f64 * scale.stop(l))
            .sum();

        let s = self.system_arrays;
        let (p, br) = self
            .gained_ranks(self.syslen())
            .fold((0.0, 0.0), |(p, br), i| {
                (p + self.precision_at(i) * s.stop[i], br + s.br[i] * s.stop[i])
            });
        report.push("NCUgu,P", None, p / denom);
        report.push("NCUgu,BR", None, br / denom);
    }

    fn rank_biased_ncu(&self, report: &mut MetricReport) {
        let gamma = self.options.gamma;
        let denom: f64 = (0..self.jrel()).map(|i| gamma.powi(i as i32)).sum();

        let s = self.system_arrays;
        let (p, br) = self
            .gained_ranks(self.syslen())
            .fold((0.0, 0.0), |(p, br), i| {
                let w = gamma.powi(s.count[i] as i32 - 1);
                (p + self.precision_at(i) * w, br + s.br[i] * w)
            });
        report.push("NCUrb,P", None, p / denom);
        report.push("NCUrb,BR", None, br / denom);
    }

    /// GAP over ranks `1..=upto`, normalised at ideal rank `norm_rank`.
    fn gap(&self, upto: usize, norm_rank: usize) -> f64 {
        let (Some(sys), Some(ideal)) = (&self.system_arrays.gap, &self.ideal_arrays.gap) else {
            return 0.0;
        };
        let sum: f64 = (1..=upto).map(|i| sys[i] / i as f64).sum();
        sum / ideal[norm_rank]
    }

    fn rbp_at(&self, i: usize) -> f64 {
        (1.0 - self.options.rbp_persistence) * self.system_arrays.rbp_sum[i] / self.hgain()
    }

    fn whole_list(&self, report: &mut MetricReport) {
        let (s, ideal) = (self.system_arrays, self.ideal_arrays);
        let syslen = self.syslen();
        let maxlen = s.maxlen();

        report.push("RBP", None, self.rbp_at(syslen));
        report.push("ERR", None, s.err[syslen]);
        report.push("EBR", None, s.ebr[syslen]);
        report.push("nDCG", None, s.dcg[maxlen] / ideal.dcg[maxlen]);
        report.push("MSnDCG", None, s.ms_dcg[maxlen] / ideal.ms_dcg[maxlen]);
        if let Some(irbu) = &s.irbu {
            report.push("iRBU", None, irbu[syslen]);
        }
    }

    fn at_cutoff(&self, report: &mut MetricReport, k: usize) {
        let (s, ideal) = (self.system_arrays, self.ideal_arrays);
        let cutoff = Some(k);
        let jrel = self.jrel();

        let minlen = k.min(self.syslen());
        let (ap, q) = self.ap_q_sums(minlen);
        let norm = k.min(jrel) as f64;
        report.push("AP", cutoff, ap / norm);
        report.push("Q", cutoff, q / norm);

        if self.options.compute_gap {
            report.push("GAP", cutoff, self.gap(minlen, k.min(jrel)));
        }

        // saturates once both lists are exhausted
        let idx = k.min(s.maxlen());
        report.push("nDCG", cutoff, s.dcg[idx] / ideal.dcg[idx]);
        report.push("MSnDCG", cutoff, s.ms_dcg[idx] / ideal.ms_dcg[idx]);
        // nominal k, even past maxlen
        report.push("P", cutoff, s.count[idx] as f64 / k as f64);
        report.push("RBP", cutoff, self.rbp_at(idx));
        report.push("ERR", cutoff, s.err[idx]);
        report.push("nERR", cutoff, s.err[idx] / ideal.err[idx]);
        report.push("EBR", cutoff, s.ebr[idx]);
        if let Some(irbu) = &s.irbu {
            report.push("iRBU", cutoff, irbu[idx]);
        }
        let hit = if s.count[idx] > 0 { 1.0 } else { 0.0 };
        report.push("Hit", cutoff, hit);
    }

    fn bpref(&self, report: &mut MetricReport) {
        let s = self.system_arrays;
        let r = self.jrel() as f64;
        let n = self.ideal.nonrelevant_count() as f64;

        let mut sums = [0.0; 4];
        for i in self.gained_ranks(self.syslen()) {
            // nonrelevant documents ranked above i
            let above = (i - s.count[i]) as f64;
            let capped = above.min(r);
            sums[0] += 1.0 - capped / r.min(n);
            sums[1] += 1.0 - capped / r;
            sums[2] += 1.0 - above / n;
            if i > 1 {
                sums[3] += 1.0 - above / (i - 1) as f64;
            }
        }

        report.push("bpref", None, sums[0] / r);
        report.push("bpref_R", None, sums[1] / r);
        report.push("bpref_N", None, sums[2] / r);
        report.push("bpref_relative", None, sums[3] / r);
    }

    fn rpref(&self, report: &mut MetricReport) {
        let s = self.system_arrays;
        let jrel = self.jrel();
        let cgi = self.ideal_arrays.cg[jrel];
        let denom_n =
            jrel as f64 + self.ideal.nonrelevant_count() as f64 - cgi / self.hgain();

        let mut sums = [0.0; 3];
        for i in self.gained_ranks(self.syslen()) {
            let g = s.gain[i];
            let penalty: f64 = (1..i)
                .map(|j| s.gain[j])
                .filter(|&gj| g > gj)
                .map(|gj| (g - gj) / g)
                .sum();
            sums[0] += g * (1.0 - penalty / denom_n);
            if i > 1 {
                sums[1] += g * (1.0 - penalty / (i - 1) as f64);
            }
            sums[2] += g * (1.0 - penalty / i as f64);
        }

        report.push("rpref_N", None, sums[0] / cgi);
        report.push("rpref_relative", None, sums[1] / cgi);
        report.push("rpref_relative2", None, sums[2] / cgi);
    }
}
