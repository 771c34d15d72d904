//! Per-level gain and stop values for level-mode judgments.

use itertools::Itertools;

use crate::error::{EvalError, Result};

/// Highest relevance level a scale may declare
pub const MAX_RELEVANCE_LEVEL: usize = 15;

/// Maps relevance levels `L0..=Lmax` to gain values and to the stop values
/// used by graded-uniform NCU.
///
/// Level 0 (judged nonrelevant) always has gain 0 and stop 0. Both vectors
/// are non-decreasing in the level.
#[derive(Clone, Debug, PartialEq)]
pub struct RelevanceScale {
    gains: Vec<f64>,
    stops: Vec<f64>,
}

impl RelevanceScale {
    /// Build a scale from gains for `L1..=Lmax` (least relevant first) and
    /// optional stop values for the same levels. Missing stop values default
    /// to the gains.
    pub fn new(gains: Vec<f64>, stops: Option<Vec<f64>>) -> Result<Self> {
        if gains.is_empty() {
            return Err(EvalError::EmptyScale);
        }
        if gains.len() > MAX_RELEVANCE_LEVEL {
            return Err(EvalError::TooManyLevels {
                count: gains.len(),
                max: MAX_RELEVANCE_LEVEL,
            });
        }
        let stops = match stops {
            Some(stops) => {
                if stops.len() > MAX_RELEVANCE_LEVEL {
                    return Err(EvalError::TooManyLevels {
                        count: stops.len(),
                        max: MAX_RELEVANCE_LEVEL,
                    });
                }
                if stops.len() != gains.len() {
                    return Err(EvalError::ScaleLengthMismatch {
                        gains: gains.len(),
                        stops: stops.len(),
                    });
                }
                if let Some((i, &value)) = stops.iter().find_position(|&&s| !(s > 0.0)) {
                    return Err(EvalError::NonPositiveStop {
                        level: i + 1,
                        value,
                    });
                }
                stops
            }
            None => gains.clone(),
        };
        if let Some((i, &value)) = gains.iter().find_position(|&&g| !(g >= 0.0)) {
            return Err(EvalError::NegativeScaleGain {
                level: i + 1,
                value,
            });
        }
        check_monotonic("gain", &gains)?;
        check_monotonic("stop", &stops)?;

        Ok(Self {
            gains: std::iter::once(0.0).chain(gains).collect(),
            stops: std::iter::once(0.0).chain(stops).collect(),
        })
    }

    /// Parse `1:2:3`-style gain (and optional stop) specifications.
    pub fn parse(gains: &str, stops: Option<&str>) -> Result<Self> {
        let stops = stops.map(|s| parse_levels(s, "stop")).transpose()?;
        Self::new(parse_levels(gains, "gain")?, stops)
    }

    /// Highest declared relevance level.
    pub fn max_level(&self) -> usize {
        self.gains.len() - 1
    }

    pub fn gain(&self, level: usize) -> f64 {
        self.gains[level]
    }

    pub fn stop(&self, level: usize) -> f64 {
        self.stops[level]
    }

    /// Gain of the highest declared level; the ERR/RBP normaliser in level mode.
    pub fn highest_gain(&self) -> f64 {
        self.gains[self.max_level()]
    }

    pub fn check_level(&self, level: usize) -> Result<usize> {
        if level > self.max_level() {
            Err(EvalError::LevelOutOfRange {
                level,
                max: self.max_level(),
            })
        } else {
            Ok(level)
        }
    }
}

fn check_monotonic(which: &'static str, values: &[f64]) -> Result<()> {
    // any lower level above any higher level; adjacent pairs suffice
    match values
        .iter()
        .enumerate()
        .tuple_windows()
        .find(|((_, a), (_, b))| a > b)
    {
        Some(((i, &lower_value), (j, &higher_value))) => Err(EvalError::NonMonotonicScale {
            which,
            lower: i + 1,
            lower_value,
            higher: j + 1,
            higher_value,
        }),
        None => Ok(()),
    }
}

fn parse_levels(spec: &str, which: &'static str) -> Result<Vec<f64>> {
    spec.split(':')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| EvalError::MalformedRecord {
                    line: 0,
                    detail: format!("bad {which} value {s:?}: {e}"),
                })
        })
        .collect()
}

/// Parse a relevance label of the form `L<n>`.
pub fn parse_label(label: &str) -> Result<usize> {
    label
        .strip_prefix('L')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&n| n <= MAX_RELEVANCE_LEVEL)
        .ok_or_else(|| EvalError::InvalidLabel {
            label: label.to_string(),
        })
}
