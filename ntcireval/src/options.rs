use crate::error::{EvalError, Result};

/// Q-measure's blended-ratio beta
pub const DEFAULT_BETA: f64 = 1.0;
/// Rank-biased NCU gamma
pub const DEFAULT_GAMMA: f64 = 0.95;
/// Log base of the original (Jarvelin/Kekalainen) DCG discount
pub const DEFAULT_LOG_BASE: f64 = 2.0;
/// RBP persistence
pub const DEFAULT_RBP: f64 = 0.95;
/// Cutoff used when none is given
pub const DEFAULT_CUTOFF: usize = 1000;
/// The tenth cutoff is rejected
pub const MAX_CUTOFFS: usize = 9;

/// Immutable run-wide configuration for one evaluation.
///
/// Built once before the pipeline starts and only read afterwards. Gain
/// vectors and equivalence-class handling are not here: they travel with the
/// resolved judgments as a [`crate::Grading`].
#[derive(Clone, Debug, derive_builder::Builder)]
pub struct EvalOptions {
    /// System list is a condensed list (unjudged documents removed);
    /// enables bpref and rpref
    #[builder(default)]
    pub condensed: bool,

    /// Q-measure beta (> 0)
    #[builder(default = "DEFAULT_BETA")]
    pub beta: f64,

    /// Rank-biased NCU gamma, in (0, 1]
    #[builder(default = "DEFAULT_GAMMA")]
    pub gamma: f64,

    /// Log base for the original DCG; zero selects the natural log
    #[builder(default = "DEFAULT_LOG_BASE")]
    pub log_base: f64,

    /// RBP persistence, in (0, 1]
    #[builder(default = "DEFAULT_RBP")]
    pub rbp_persistence: f64,

    /// Ranks at which position-bounded metrics are reported
    #[builder(default = "vec![DEFAULT_CUTOFF]")]
    pub cutoffs: Vec<usize>,

    /// Compute Robertson GAP (quadratic in the system list length)
    #[builder(default)]
    pub compute_gap: bool,

    /// Intentwise RBU persistence; iRBU is only computed when this is set
    #[builder(setter(strip_option), default)]
    pub rbu_persistence: Option<f64>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        // every field carries a builder default
        EvalOptionsBuilder::default().build().unwrap()
    }
}

impl EvalOptions {
    /// Check every parameter range. Called by the pipeline before any input
    /// is touched.
    pub fn validate(&self) -> Result<()> {
        if !(self.beta > 0.0) {
            return Err(invalid("beta", self.beta, "a positive value"));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(invalid("gamma", self.gamma, "a value in (0, 1]"));
        }
        if !(self.log_base >= 0.0) {
            return Err(invalid("logb", self.log_base, "a value >= 0"));
        }
        if !(self.rbp_persistence > 0.0 && self.rbp_persistence <= 1.0) {
            return Err(invalid("rbp", self.rbp_persistence, "a value in (0, 1]"));
        }
        if let Some(p) = self.rbu_persistence
            && !(p > 0.0 && p <= 1.0)
        {
            return Err(invalid("rbup", p, "a value in (0, 1]"));
        }
        if self.cutoffs.len() > MAX_CUTOFFS {
            return Err(EvalError::TooManyCutoffs {
                count: self.cutoffs.len(),
                max: MAX_CUTOFFS,
            });
        }
        if self.cutoffs.is_empty() {
            return Err(invalid("cutoffs", 0.0, "at least one cutoff"));
        }
        if self.cutoffs.contains(&0) {
            return Err(invalid("cutoff", 0.0, "a rank >= 1"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, expected: &'static str) -> EvalError {
    EvalError::InvalidParameter {
        name,
        value,
        expected,
    }
}
