//! Property-based tests for the evaluation pipeline.
//!
//! Topics are random gain assignments over a small document pool; rankings
//! are shuffled subsets of the judged documents, optionally interleaved with
//! unjudged ones.

use proptest::prelude::*;

use ntcireval::{
    EvalOptions, EvalOptionsBuilder, GainRecord, Grade, Grading, Judgments, MetricReport,
    SystemEntry, SystemSequence, evaluate, evaluate_with_arrays,
};

const CUTOFFS: [usize; 4] = [1, 3, 5, 20];

// ── Strategies ────────────────────────────────────────────────────────

/// A topic: per-document gains plus a ranking of document indices.
#[derive(Clone, Debug)]
struct Topic {
    gains: Vec<u32>,
    ranking: Vec<usize>,
}

fn arb_gains() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0_u32..=3, 1..=12)
        .prop_filter("need a relevant document", |g| g.iter().any(|&x| x > 0))
}

/// Rankings draw from judged documents only.
fn arb_judged_topic() -> impl Strategy<Value = Topic> {
    arb_gains().prop_flat_map(|gains| {
        let n = gains.len();
        (
            Just(gains),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            0..=n,
        )
            .prop_map(|(gains, mut order, take)| {
                order.truncate(take);
                Topic {
                    gains,
                    ranking: order,
                }
            })
    })
}

/// Judged documents plus `u<i>` unjudged ones, indices past the pool.
fn arb_topic() -> impl Strategy<Value = Topic> {
    arb_gains().prop_flat_map(|gains| {
        let n = gains.len();
        (
            Just(gains),
            Just((0..n + 4).collect::<Vec<_>>()).prop_shuffle(),
            0..=n + 4,
        )
            .prop_map(|(gains, mut order, take)| {
                order.truncate(take);
                Topic {
                    gains,
                    ranking: order,
                }
            })
    })
}

// ── Helpers ───────────────────────────────────────────────────────────

fn judgments(topic: &Topic) -> Judgments {
    let mut records: Vec<GainRecord> = topic
        .gains
        .iter()
        .enumerate()
        .map(|(i, &g)| GainRecord {
            doc_id: format!("d{i}"),
            gain: g as f64,
        })
        .collect();
    records.sort_by(|a, b| b.gain.total_cmp(&a.gain));
    Judgments::from_gains(records).unwrap()
}

fn system(topic: &Topic) -> SystemSequence {
    let entries = topic.ranking.iter().map(|&i| match topic.gains.get(i) {
        Some(&g) => SystemEntry::new(format!("d{i}"), Some(Grade::Gain(g as f64))),
        None => SystemEntry::new(format!("u{i}"), None),
    });
    SystemSequence::from_labelled(entries, &Grading::Gain).unwrap()
}

fn options() -> EvalOptions {
    EvalOptionsBuilder::default()
        .cutoffs(CUTOFFS.to_vec())
        .build()
        .unwrap()
}

fn run(topic: &Topic) -> MetricReport {
    evaluate(&judgments(topic), &system(topic), &options()).unwrap()
}

fn metric(report: &MetricReport, name: &str, cutoff: Option<usize>) -> f64 {
    report.get(name, cutoff).unwrap()
}

fn in_unit(x: f64) -> bool {
    (0.0..=1.0 + 1e-9).contains(&x)
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Cumulative gain never decreases and discounting never amplifies it.
    #[test]
    fn ideal_cumulative_gain_is_monotone(topic in arb_topic()) {
        let eval = evaluate_with_arrays(&judgments(&topic), &system(&topic), &options()).unwrap();
        for a in [&eval.ideal, &eval.system] {
            for r in 1..=a.maxlen() {
                prop_assert!(a.cg[r] >= a.cg[r - 1]);
                prop_assert!(a.dcg[r] <= a.cg[r] + 1e-12,
                    "DCG {} exceeds CG {} at rank {}", a.dcg[r], a.cg[r], r);
            }
        }
    }

    /// With judged-only rankings, AP and nDCG stay within [0, 1].
    #[test]
    fn ap_and_ndcg_bounded(topic in arb_judged_topic()) {
        let r = run(&topic);
        for name in ["AP", "nDCG", "MSnDCG", "Q-measure"] {
            let v = metric(&r, name, None);
            prop_assert!(in_unit(v), "{} out of bounds: {}", name, v);
        }
        for k in CUTOFFS {
            for name in ["nDCG", "MSnDCG", "AP", "Q", "P", "nERR"] {
                let v = metric(&r, name, Some(k));
                prop_assert!(in_unit(v), "{}@{} out of bounds: {}", name, k, v);
            }
        }
    }

    /// RR is 1 exactly when the top document is relevant and 0 exactly when
    /// nothing relevant was retrieved.
    #[test]
    fn reciprocal_rank_extremes(topic in arb_topic()) {
        let r = run(&topic);
        let rr = metric(&r, "RR", None);
        let relevant = |&i: &usize| topic.gains.get(i).is_some_and(|&g| g > 0);

        let top_relevant = topic.ranking.first().is_some_and(relevant);
        prop_assert_eq!(rr == 1.0, top_relevant);

        let any_relevant = topic.ranking.iter().any(relevant);
        prop_assert_eq!(rr == 0.0, !any_relevant);
    }

    /// Hit@k is an indicator.
    #[test]
    fn hit_is_binary(topic in arb_topic()) {
        let r = run(&topic);
        for k in CUTOFFS {
            let hit = metric(&r, "Hit", Some(k));
            prop_assert!(hit == 0.0 || hit == 1.0);
        }
    }

    /// Early-precision measures vanish together.
    #[test]
    fn no_relevant_retrieved_zeroes_early_precision(topic in arb_topic()) {
        let r = run(&topic);
        if r.first_relevant == 0 {
            for name in ["RR", "O-measure", "P-measure", "P-plus", "AP", "Q-measure"] {
                prop_assert_eq!(metric(&r, name, None), 0.0);
            }
        } else {
            prop_assert!(r.preferred >= r.first_relevant);
        }
    }

    /// Running the pipeline twice gives bit-identical output.
    #[test]
    fn evaluation_is_deterministic(topic in arb_topic()) {
        let opts = EvalOptionsBuilder::default()
            .compute_gap(true)
            .rbu_persistence(0.9)
            .cutoffs(CUTOFFS.to_vec())
            .build()
            .unwrap();
        let (j, s) = (judgments(&topic), system(&topic));
        let a = evaluate(&j, &s, &opts).unwrap();
        let b = evaluate(&j, &s, &opts).unwrap();
        prop_assert_eq!(a.render("t"), b.render("t"));
        for ((ka, va), (kb, vb)) in a.entries().iter().zip(b.entries()) {
            prop_assert_eq!(ka, kb);
            prop_assert_eq!(va.to_bits(), vb.to_bits());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// On condensed lists the bpref family is bounded.
    #[test]
    fn bpref_bounded_on_condensed_lists(topic in arb_judged_topic()) {
        prop_assume!(topic.gains.contains(&0));
        let opts = EvalOptionsBuilder::default()
            .condensed(true)
            .build()
            .unwrap();
        let r = evaluate(&judgments(&topic), &system(&topic), &opts).unwrap();
        for name in ["bpref", "bpref_R", "bpref_N"] {
            let v = metric(&r, name, None);
            prop_assert!(in_unit(v), "{} out of bounds: {}", name, v);
        }
    }

    /// Ranking every relevant document first, best first, is perfect.
    #[test]
    fn ideal_ranking_scores_one(gains in arb_gains()) {
        let mut ranking: Vec<usize> = (0..gains.len()).filter(|&i| gains[i] > 0).collect();
        ranking.sort_by(|&a, &b| gains[b].cmp(&gains[a]));
        let topic = Topic { gains, ranking };
        let r = run(&topic);
        for name in ["AP", "nDCG", "MSnDCG", "RR"] {
            let v = metric(&r, name, None);
            prop_assert!((v - 1.0).abs() < 1e-9, "{} = {}", name, v);
        }
    }
}
