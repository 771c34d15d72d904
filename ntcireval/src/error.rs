/// Every way a single-topic evaluation can fail.
///
/// All variants are fatal to the evaluation in progress: the pipeline never
/// hands back a partial report. Use [`EvalError::kind`] to branch on the
/// broad category without matching every variant.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    // === Input format errors ===
    /// A record is missing a required field or a field does not parse.
    #[error("Malformed record at line {line}: {detail}")]
    MalformedRecord { line: usize, detail: String },

    /// A line exceeds the reader's size bound.
    #[error("Line {line} too long: {len} bytes exceeds the {max}-byte limit")]
    LineTooLong { line: usize, len: usize, max: usize },

    /// A relevance label is not of the form `L<n>`.
    #[error("Invalid relevance label {label:?}: expected L<level>, e.g. L0 or L3")]
    InvalidLabel { label: String },

    // === Value errors ===
    /// A judged gain is negative.
    #[error("Invalid gain {gain} for {doc_id}: gains must be nonnegative")]
    NegativeGain { doc_id: String, gain: f64 },

    /// Gain or stop values decrease from a lower to a higher relevance level.
    #[error("Bad {which} values: L{lower}={lower_value} exceeds L{higher}={higher_value}")]
    NonMonotonicScale {
        which: &'static str,
        lower: usize,
        lower_value: f64,
        higher: usize,
        higher_value: f64,
    },

    /// A gain value in the scale is negative.
    #[error("Bad gain value for L{level}: {value} is negative")]
    NegativeScaleGain { level: usize, value: f64 },

    /// A stop value in the scale is not positive.
    #[error("Bad stop value for L{level}: {value} (stop values must be positive)")]
    NonPositiveStop { level: usize, value: f64 },

    /// A relevance level exceeds the declared maximum.
    #[error("Relevance level L{level} exceeds the declared maximum L{max}")]
    LevelOutOfRange { level: usize, max: usize },

    /// More relevance levels were declared than are supported.
    #[error("Too many relevance levels: {count} declared, at most {max} supported")]
    TooManyLevels { count: usize, max: usize },

    /// An equivalence-class id lies outside the supported range.
    #[error("Bad equivalence class id {class}: expected 1..={max}")]
    ClassOutOfRange { class: i64, max: u32 },

    // === Precondition errors ===
    /// The judgments contain no relevant document.
    #[error("No relevant document in the judgments")]
    NoRelevant,

    /// Condensed-list metrics were requested but no judged nonrelevant document exists.
    #[error("No judged nonrelevant document: bpref etc. not computable")]
    NoJudgedNonrelevant,

    /// Gain and stop vectors declare a different number of relevance levels.
    #[error("Gain/stop relevance levels mismatch: {gains} gain values, {stops} stop values")]
    ScaleLengthMismatch { gains: usize, stops: usize },

    /// No relevance level was declared at all.
    #[error("No gain values declared")]
    EmptyScale,

    /// The highest gain used for RBP/ERR normalisation is zero.
    #[error("Highest gain is {hgain}: RBP and ERR are not computable")]
    ZeroHighestGain { hgain: f64 },

    /// The system sequence was resolved under another grading than the
    /// judgments it is evaluated against.
    #[error("System sequence was resolved for {system} grading but the judgments use {judgments} grading")]
    GradingMismatch {
        judgments: &'static str,
        system: &'static str,
    },

    /// The ideal GAP normaliser is zero.
    #[error("Ideal GAP normaliser is zero at rank {rank}")]
    ZeroGapNormaliser { rank: usize },

    // === Configuration errors ===
    /// Too many cutoffs were requested.
    #[error("Too many cutoffs: {count} given, at most {max} allowed")]
    TooManyCutoffs { count: usize, max: usize },

    /// A numeric parameter lies outside its valid range.
    #[error("Bad {name} value {value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// The truncation rank for labelling is zero.
    #[error("Bad truncate rank 0: expected a rank >= 1")]
    InvalidTruncateRank,

    // === I/O ===
    /// Reading an input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad failure categories surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed record, missing field, over-long line.
    InputFormat,
    /// A value outside its domain.
    Value,
    /// The judgments cannot support the requested metrics.
    Precondition,
    /// Invalid run configuration.
    Configuration,
    /// Underlying reader failure.
    Io,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRecord { .. } | Self::LineTooLong { .. } | Self::InvalidLabel { .. } => {
                ErrorKind::InputFormat
            }
            Self::NegativeGain { .. }
            | Self::NonMonotonicScale { .. }
            | Self::NegativeScaleGain { .. }
            | Self::NonPositiveStop { .. }
            | Self::LevelOutOfRange { .. }
            | Self::TooManyLevels { .. }
            | Self::ClassOutOfRange { .. } => ErrorKind::Value,
            Self::NoRelevant
            | Self::NoJudgedNonrelevant
            | Self::ScaleLengthMismatch { .. }
            | Self::EmptyScale
            | Self::ZeroHighestGain { .. }
            | Self::GradingMismatch { .. }
            | Self::ZeroGapNormaliser { .. } => ErrorKind::Precondition,
            Self::TooManyCutoffs { .. }
            | Self::InvalidParameter { .. }
            | Self::InvalidTruncateRank => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(EvalError::NoRelevant.kind(), ErrorKind::Precondition);
        assert_eq!(
            EvalError::LevelOutOfRange { level: 4, max: 3 }.kind(),
            ErrorKind::Value
        );
        assert_eq!(
            EvalError::TooManyCutoffs { count: 10, max: 9 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            EvalError::InvalidLabel {
                label: "X3".into()
            }
            .kind(),
            ErrorKind::InputFormat
        );
    }

    #[test]
    fn messages_name_the_offending_value() {
        let e = EvalError::ClassOutOfRange {
            class: 0,
            max: 1024,
        };
        assert_eq!(e.to_string(), "Bad equivalence class id 0: expected 1..=1024");
    }
}
