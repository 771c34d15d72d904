//! Attach judgment labels to a bare ranking.
//!
//! This is what `glabel` and `label` print, and what
//! [`crate::SystemSequence::from_ranking`] consumes.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{EvalError, Result};
use crate::judgment::{Grade, Judgments};
use crate::system::SystemEntry;

#[derive(Clone, Debug, Default, derive_builder::Builder)]
pub struct LabelOptions {
    /// Drop unjudged documents (condensed list)
    #[builder(default)]
    pub condensed: bool,

    /// Stop after this many input ranks
    #[builder(setter(strip_option), default)]
    pub truncate: Option<usize>,
}

impl LabelOptions {
    pub fn validate(&self) -> Result<()> {
        match self.truncate {
            Some(0) => Err(EvalError::InvalidTruncateRank),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Label {
    Judged { grade: Grade, class: Option<u32> },
    /// Another member of this document's equivalence class was ranked
    /// higher; counts as nonrelevant
    Redundant,
    Unjudged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelledDocument {
    pub doc_id: String,
    pub label: Label,
}

impl LabelledDocument {
    pub fn into_entry(self) -> SystemEntry {
        let grade = match self.label {
            Label::Judged { grade, .. } => Some(grade),
            Label::Redundant => Some(Grade::Level(0)),
            Label::Unjudged => None,
        };
        SystemEntry::new(self.doc_id, grade)
    }

    /// One output line, fields joined by `sep`. Unjudged and redundant
    /// documents are printed bare.
    pub fn render(&self, sep: &str) -> String {
        let doc = &self.doc_id;
        match self.label {
            Label::Judged {
                grade: Grade::Gain(gain),
                ..
            } => format!("{doc}{sep}{gain:.4}"),
            Label::Judged {
                grade: Grade::Level(level),
                class: Some(class),
            } => format!("{doc}{sep}L{level}{sep}{class}"),
            Label::Judged {
                grade: Grade::Level(level),
                class: None,
            } => format!("{doc}{sep}L{level}"),
            Label::Redundant | Label::Unjudged => doc.clone(),
        }
    }
}

/// Look every ranked docId up in `judgments`.
///
/// With equivalence classes, only the first-ranked member of each class
/// keeps its label; later members come back [`Label::Redundant`].
pub fn label_ranking<I, S>(
    ranking: I,
    judgments: &Judgments,
    options: &LabelOptions,
) -> Result<Vec<LabelledDocument>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    options.validate()?;

    let mut seen = HashSet::new();
    let mut out = vec![];
    let mut dropped = 0;

    for doc_id in ranking
        .into_iter()
        .take(options.truncate.unwrap_or(usize::MAX))
    {
        let doc_id = doc_id.into();
        let label = match judgments.entry(&doc_id) {
            None => Label::Unjudged,
            Some(entry) => match entry.class {
                Some(class) if !seen.insert(class) => Label::Redundant,
                class => Label::Judged {
                    grade: entry.grade,
                    class,
                },
            },
        };

        if options.condensed && label == Label::Unjudged {
            dropped += 1;
            continue;
        }
        out.push(LabelledDocument { doc_id, label });
    }

    debug!(labelled = out.len(), dropped, "labelled ranking");
    Ok(out)
}
