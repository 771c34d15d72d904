//! Single-topic retrieval effectiveness evaluation in the NTCIREVAL style.
//!
//! The pipeline runs in three strict phases:
//!
//! 1. [`Judgments`] resolve raw judgment records into the ideal sequence and
//!    a docId lookup, either from gain values or from `L<n>` relevance levels
//!    mapped through a [`RelevanceScale`].
//! 2. A [`SystemSequence`] tags each ranked document as relevant, judged
//!    nonrelevant or unjudged, and locates the first relevant and preferred
//!    ranks.
//! 3. [`evaluate`] builds the per-rank cumulative arrays (ideal pass first)
//!    and reduces them to a [`MetricReport`].
//!
//! ```
//! use ntcireval::{EvalOptions, GainRecord, Grade, Judgments, SystemEntry, SystemSequence, evaluate};
//!
//! let judgments = Judgments::from_gains([
//!     GainRecord { doc_id: "A".into(), gain: 3.0 },
//!     GainRecord { doc_id: "B".into(), gain: 2.0 },
//! ])?;
//! let system = SystemSequence::from_labelled(
//!     [
//!         SystemEntry::new("B", Some(Grade::Gain(2.0))),
//!         SystemEntry::new("A", Some(Grade::Gain(3.0))),
//!     ],
//!     judgments.grading(),
//! )?;
//! let report = evaluate(&judgments, &system, &EvalOptions::default())?;
//! assert_eq!(report.get("RR", None), Some(1.0));
//! # Ok::<(), ntcireval::EvalError>(())
//! ```

pub mod aggregate;
pub mod cumulative;
pub mod error;
pub mod evaluate;
pub mod judgment;
pub mod label;
pub mod options;
pub mod read;
pub mod report;
pub mod scale;
pub mod system;

pub use cumulative::CumulativeArrays;
pub use error::{ErrorKind, EvalError, Result};
pub use evaluate::{Evaluation, evaluate, evaluate_with_arrays};
pub use judgment::{GainRecord, Grade, Grading, IdealSequence, JudgedDocument, Judgments, LevelRecord};
pub use label::{Label, LabelOptions, LabelOptionsBuilder, LabelledDocument, label_ranking};
pub use options::{EvalOptions, EvalOptionsBuilder};
pub use report::{MetricKey, MetricReport};
pub use scale::RelevanceScale;
pub use system::{RankedDocument, Status, SystemEntry, SystemSequence};
