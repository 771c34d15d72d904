use tracing::debug;

use crate::error::{EvalError, Result};
use crate::judgment::{Grade, Grading, Judgments};
use crate::label::{LabelOptions, label_ranking};

/// Judgment status of one ranked document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Relevant,
    JudgedNonrelevant,
    Unjudged,
}

/// A ranked document as handed to the system pass: a docId plus the label
/// found next to it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemEntry {
    pub doc_id: String,
    pub grade: Option<Grade>,
}

impl SystemEntry {
    pub fn new(doc_id: impl Into<String>, grade: Option<Grade>) -> Self {
        Self {
            doc_id: doc_id.into(),
            grade,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedDocument {
    pub doc_id: String,
    pub status: Status,
    /// Zero unless relevant
    pub gain: f64,
    /// Level mode only; unjudged documents sit at level 0
    pub level: Option<usize>,
    /// Graded-uniform NCU stop value, level mode only
    pub stop: f64,
}

impl RankedDocument {
    fn resolve(rank: usize, entry: SystemEntry, grading: &Grading) -> Result<Self> {
        let SystemEntry { doc_id, grade } = entry;

        let (status, gain, level, stop) = match (grading, grade) {
            (Grading::Gain, None) => (Status::Unjudged, 0.0, None, 0.0),
            (Grading::Gain, Some(Grade::Gain(gain))) => {
                if !(gain >= 0.0) {
                    return Err(EvalError::NegativeGain { doc_id, gain });
                }
                if gain > 0.0 {
                    (Status::Relevant, gain, None, 0.0)
                } else {
                    (Status::JudgedNonrelevant, 0.0, None, 0.0)
                }
            }
            (Grading::Level(_), None) => (Status::Unjudged, 0.0, Some(0), 0.0),
            (Grading::Level(scale), Some(Grade::Level(level))) => {
                let level = scale.check_level(level)?;
                if level > 0 {
                    (Status::Relevant, scale.gain(level), Some(level), scale.stop(level))
                } else {
                    (Status::JudgedNonrelevant, 0.0, Some(0), 0.0)
                }
            }
            (Grading::Gain, Some(Grade::Level(_))) => {
                return Err(mismatch(rank, &doc_id, "level", grading));
            }
            (Grading::Level(_), Some(Grade::Gain(_))) => {
                return Err(mismatch(rank, &doc_id, "gain", grading));
            }
        };

        Ok(Self {
            doc_id,
            status,
            gain,
            level,
            stop,
        })
    }

    pub fn is_relevant(&self) -> bool {
        self.status == Status::Relevant
    }
}

/// The system's ranked output, resolved against the judgments.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSequence {
    docs: Vec<RankedDocument>,
    grading: Grading,
    first_relevant: usize,
    preferred: usize,
}

impl SystemSequence {
    /// Build from an already-labelled ranking (the `doc [label]` files that
    /// `glabel`/`label` produce). Labels are validated against `grading`.
    pub fn from_labelled<I>(entries: I, grading: &Grading) -> Result<Self>
    where
        I: IntoIterator<Item = SystemEntry>,
    {
        let docs = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankedDocument::resolve(i + 1, entry, grading))
            .collect::<Result<Vec<_>>>()?;

        let first_relevant = docs
            .iter()
            .position(RankedDocument::is_relevant)
            .map_or(0, |i| i + 1);

        let preferred = match grading {
            // first relevant rank holding the highest gain in the whole list
            Grading::Gain => {
                let max = docs.iter().map(|d| d.gain).fold(0.0, f64::max);
                docs.iter()
                    .position(|d| d.is_relevant() && d.gain == max)
                    .map_or(0, |i| i + 1)
            }
            // rank where the running maximum level was last raised
            Grading::Level(_) => {
                let mut max_level = 0;
                let mut rp = 0;
                for (i, d) in docs.iter().enumerate() {
                    if let Some(level) = d.level
                        && d.is_relevant()
                        && level > max_level
                    {
                        max_level = level;
                        rp = i + 1;
                    }
                }
                rp
            }
        };

        debug!(
            syslen = docs.len(),
            r1 = first_relevant,
            rp = preferred,
            "built system sequence"
        );

        Ok(Self {
            docs,
            grading: grading.clone(),
            first_relevant,
            preferred,
        })
    }

    /// Build from a bare ranking of docIds by looking each one up in the
    /// judgments, exactly as the labelling utilities would.
    pub fn from_ranking<I, S>(ranking: I, judgments: &Judgments, options: &LabelOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labelled = label_ranking(ranking, judgments, options)?;
        Self::from_labelled(
            labelled.into_iter().map(|d| d.into_entry()),
            judgments.grading(),
        )
    }

    pub fn docs(&self) -> &[RankedDocument] {
        &self.docs
    }

    /// The grading the labels were resolved under.
    pub fn grading(&self) -> &Grading {
        &self.grading
    }

    /// syslen
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// r1: rank of the first relevant document, 0 if none
    pub fn first_relevant(&self) -> usize {
        self.first_relevant
    }

    /// rp: preferred rank for P-measure and P-plus, 0 if no relevant document
    pub fn preferred(&self) -> usize {
        self.preferred
    }
}

fn mismatch(rank: usize, doc_id: &str, found: &str, grading: &Grading) -> EvalError {
    EvalError::MalformedRecord {
        line: rank,
        detail: format!(
            "{doc_id}: {found} label in a ranking evaluated by {}",
            grading.name()
        ),
    }
}
