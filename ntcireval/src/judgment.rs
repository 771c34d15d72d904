//! Turns raw judgment records into the ideal sequence and the per-document
//! lookup table.
//!
//! Two input modes exist. Gain-mode records carry a gain value directly and
//! the ideal order is the caller's. Level-mode records carry an `L<n>` level
//! which a [`RelevanceScale`] maps to a gain; the ideal sequence is rebuilt
//! from the per-level counts, highest level first, optionally collapsing
//! equivalence classes to their best member.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::scale::RelevanceScale;

/// Equivalence-class ids must lie in `1..=MAX_EQUIVALENCE_CLASS`
pub const MAX_EQUIVALENCE_CLASS: u32 = 1024;

/// How judged documents are graded.
#[derive(Clone, Debug, PartialEq)]
pub enum Grading {
    /// Records carry gain values.
    Gain,
    /// Records carry relevance levels mapped through the scale.
    Level(RelevanceScale),
}

impl Grading {
    pub fn name(&self) -> &'static str {
        match self {
            Grading::Gain => "gain",
            Grading::Level(_) => "level",
        }
    }

    pub fn scale(&self) -> Option<&RelevanceScale> {
        match self {
            Grading::Gain => None,
            Grading::Level(scale) => Some(scale),
        }
    }
}

/// What a judgment (or a system-side label) says about one document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Grade {
    Gain(f64),
    Level(usize),
}

/// `(docId, gain)` as found in an ideal list.
#[derive(Clone, Debug, PartialEq)]
pub struct GainRecord {
    pub doc_id: String,
    pub gain: f64,
}

/// `(docId, level[, classId])` as found in a relevance assessment file.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRecord {
    pub doc_id: String,
    pub level: usize,
    pub class: Option<i64>,
}

/// One entry of the ideal sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct JudgedDocument {
    pub doc_id: String,
    pub gain: f64,
    /// Relevance level; `None` in gain mode
    pub level: Option<usize>,
    pub relevant: bool,
}

/// Judged documents in ideal order: all relevant documents by non-increasing
/// gain, then the judged nonrelevant ones.
#[derive(Clone, Debug, PartialEq)]
pub struct IdealSequence {
    docs: Vec<JudgedDocument>,
    relevant: usize,
    nonrelevant: usize,
    hgain: f64,
    level_counts: Option<Vec<usize>>,
}

impl IdealSequence {
    /// R
    pub fn relevant_count(&self) -> usize {
        self.relevant
    }

    /// N
    pub fn nonrelevant_count(&self) -> usize {
        self.nonrelevant
    }

    /// Normaliser for RBP and ERR.
    pub fn highest_gain(&self) -> f64 {
        self.hgain
    }

    /// The relevant prefix, the only part the metrics consume.
    pub fn relevant(&self) -> &[JudgedDocument] {
        &self.docs[..self.relevant]
    }

    pub fn docs(&self) -> &[JudgedDocument] {
        &self.docs
    }

    /// Number of judged documents (or classes) per level, level mode only.
    pub fn level_counts(&self) -> Option<&[usize]> {
        self.level_counts.as_deref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TableEntry {
    pub(crate) grade: Grade,
    pub(crate) class: Option<u32>,
}

/// Resolved judgments for one topic: the ideal sequence plus the
/// docId lookup used to label a ranking.
#[derive(Clone, Debug)]
pub struct Judgments {
    grading: Grading,
    ideal: IdealSequence,
    table: HashMap<String, TableEntry>,
}

impl Judgments {
    /// Gain-mode resolution. The caller's order is the ideal order; it is
    /// expected to be by non-increasing gain.
    pub fn from_gains<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = GainRecord>,
    {
        let mut table = HashMap::new();
        let mut relevant = vec![];
        let mut nonrelevant = vec![];
        let mut hgain = 0.0_f64;

        for GainRecord { doc_id, gain } in records {
            if !(gain >= 0.0) {
                return Err(EvalError::NegativeGain { doc_id, gain });
            }
            insert_first(
                &mut table,
                &doc_id,
                TableEntry {
                    grade: Grade::Gain(gain),
                    class: None,
                },
            );
            let doc = JudgedDocument {
                doc_id,
                gain,
                level: None,
                relevant: gain > 0.0,
            };
            if doc.relevant {
                hgain = hgain.max(gain);
                relevant.push(doc);
            } else {
                nonrelevant.push(doc);
            }
        }

        if relevant
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.gain < b.gain)
        {
            warn!("ideal list is not sorted by non-increasing gain; using the given order");
        }

        let ideal = IdealSequence {
            relevant: relevant.len(),
            nonrelevant: nonrelevant.len(),
            hgain,
            docs: relevant.into_iter().chain(nonrelevant).collect(),
            level_counts: None,
        };
        debug!(
            jrel = ideal.relevant,
            jnonrel = ideal.nonrelevant,
            hgain,
            "resolved gain-mode judgments"
        );

        Ok(Self {
            grading: Grading::Gain,
            ideal,
            table,
        })
    }

    /// Level-mode resolution. With `equivalence_classes`, every record must
    /// carry a class id and each class contributes one ideal entry at its
    /// highest level.
    pub fn from_levels<I>(
        records: I,
        scale: RelevanceScale,
        equivalence_classes: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = LevelRecord>,
    {
        let mut table = HashMap::new();
        // one entry per class (or per record outside EC mode), first-seen order
        let mut units: Vec<(String, usize)> = vec![];
        let mut class_slot: HashMap<u32, usize> = HashMap::new();

        for (line, LevelRecord {
            doc_id,
            level,
            class,
        }) in records.into_iter().enumerate()
        {
            let level = scale.check_level(level)?;
            let class = if equivalence_classes {
                let class = class.ok_or_else(|| EvalError::MalformedRecord {
                    line: line + 1,
                    detail: format!("missing equivalence class id for {doc_id}"),
                })?;
                Some(check_class(class)?)
            } else {
                None
            };

            insert_first(
                &mut table,
                &doc_id,
                TableEntry {
                    grade: Grade::Level(level),
                    class,
                },
            );

            match class {
                Some(class) => match class_slot.entry(class) {
                    Entry::Occupied(slot) => {
                        let unit = &mut units[*slot.get()];
                        if unit.1 < level {
                            *unit = (doc_id, level);
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(units.len());
                        units.push((doc_id, level));
                    }
                },
                None => units.push((doc_id, level)),
            }
        }

        let mut level_counts = vec![0; scale.max_level() + 1];
        for (_, level) in &units {
            level_counts[*level] += 1;
        }

        // stable: equal levels keep their first-seen order
        units.sort_by(|a, b| b.1.cmp(&a.1));
        let docs: Vec<JudgedDocument> = units
            .into_iter()
            .map(|(doc_id, level)| JudgedDocument {
                doc_id,
                gain: scale.gain(level),
                level: Some(level),
                relevant: level > 0,
            })
            .collect();

        let ideal = IdealSequence {
            relevant: level_counts[1..].iter().sum(),
            nonrelevant: level_counts[0],
            hgain: scale.highest_gain(),
            docs,
            level_counts: Some(level_counts),
        };
        debug!(
            jrel = ideal.relevant,
            jnonrel = ideal.nonrelevant,
            maxrl = scale.max_level(),
            equivalence_classes,
            "resolved level-mode judgments"
        );

        Ok(Self {
            grading: Grading::Level(scale),
            ideal,
            table,
        })
    }

    pub fn grading(&self) -> &Grading {
        &self.grading
    }

    pub fn ideal(&self) -> &IdealSequence {
        &self.ideal
    }

    /// The recorded judgment for `doc_id`, if any.
    pub fn grade(&self, doc_id: &str) -> Option<Grade> {
        self.table.get(doc_id).map(|e| e.grade)
    }

    pub(crate) fn entry(&self, doc_id: &str) -> Option<&TableEntry> {
        self.table.get(doc_id)
    }
}

fn insert_first(table: &mut HashMap<String, TableEntry>, doc_id: &str, entry: TableEntry) {
    match table.entry(doc_id.to_string()) {
        Entry::Occupied(_) => warn!(doc_id, "duplicate judgment; keeping the first one"),
        Entry::Vacant(slot) => {
            slot.insert(entry);
        }
    }
}

pub(crate) fn check_class(class: i64) -> Result<u32> {
    u32::try_from(class)
        .ok()
        .filter(|c| (1..=MAX_EQUIVALENCE_CLASS).contains(c))
        .ok_or(EvalError::ClassOutOfRange {
            class,
            max: MAX_EQUIVALENCE_CLASS,
        })
}
