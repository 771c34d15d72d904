//! Line-oriented readers for judgment files and rankings.
//!
//! Fields are split on any character of the separator string and runs of
//! separators collapse, so `" \t"` splits on both spaces and tabs. Blank
//! lines and `#` comments are skipped.

use std::io::{self, BufRead};

use crate::error::{EvalError, Result};
use crate::judgment::{GainRecord, Grade, LevelRecord};
use crate::scale::parse_label;
use crate::system::SystemEntry;

pub const DEFAULT_SEPARATOR: &str = " ";
/// Longest accepted input line, in bytes
pub const MAX_LINE_LEN: usize = 8192;

/// Split `line` into its non-empty fields.
pub fn fields<'a>(line: &'a str, sep: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    line.split(move |c: char| sep.contains(c))
        .filter(|f| !f.is_empty())
}

/// Numbered content lines, comments and blanks dropped.
fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let n = i + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    return Some(Err(malformed(n, "line is not valid UTF-8")));
                }
                Err(e) => return Some(Err(EvalError::Io(e))),
            };
            if line.len() > MAX_LINE_LEN {
                return Some(Err(EvalError::LineTooLong {
                    line: n,
                    len: line.len(),
                    max: MAX_LINE_LEN,
                }));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(Ok((n, line)))
            }
        })
}

fn malformed(line: usize, detail: impl Into<String>) -> EvalError {
    EvalError::MalformedRecord {
        line,
        detail: detail.into(),
    }
}

fn parse_gain(line: usize, field: &str) -> Result<f64> {
    field
        .trim()
        .parse()
        .map_err(|e| malformed(line, format!("bad gain value {field:?}: {e}")))
}

/// `<doc> <gain>` per line, in ideal order.
pub fn gain_judgments<R: BufRead>(reader: R, sep: &str) -> Result<Vec<GainRecord>> {
    content_lines(reader)
        .map(|line| {
            let (n, line) = line?;
            let mut f = fields(&line, sep);
            match (f.next(), f.next()) {
                (Some(doc), Some(gain)) => Ok(GainRecord {
                    doc_id: doc.to_string(),
                    gain: parse_gain(n, gain)?,
                }),
                _ => Err(malformed(n, "expected <docID> <gain>")),
            }
        })
        .collect()
}

/// `<doc> L<n> [<class>]` per line.
pub fn level_judgments<R: BufRead>(reader: R, sep: &str) -> Result<Vec<LevelRecord>> {
    content_lines(reader)
        .map(|line| {
            let (n, line) = line?;
            let mut f = fields(&line, sep);
            let (Some(doc), Some(label)) = (f.next(), f.next()) else {
                return Err(malformed(n, "expected <docID> L<level> [<class>]"));
            };
            let class = f
                .next()
                .map(|c| {
                    c.trim()
                        .parse::<i64>()
                        .map_err(|e| malformed(n, format!("bad class id {c:?}: {e}")))
                })
                .transpose()?;
            Ok(LevelRecord {
                doc_id: doc.to_string(),
                level: parse_label(label)?,
                class,
            })
        })
        .collect()
}

/// The first field of every line: a bare ranking.
pub fn ranking<R: BufRead>(reader: R, sep: &str) -> Result<Vec<String>> {
    content_lines(reader)
        .filter_map(|line| match line {
            Ok((_, line)) => {
                let doc = fields(&line, sep).next().map(str::to_string);
                doc.map(Ok)
            }
            Err(e) => Some(Err(e)),
        })
        .collect()
}

/// `<doc> [<gain>]` per line. With `condensed`, unlabelled documents are
/// left out.
pub fn gain_labelled<R: BufRead>(reader: R, sep: &str, condensed: bool) -> Result<Vec<SystemEntry>> {
    let mut out = vec![];
    for line in content_lines(reader) {
        let (n, line) = line?;
        let mut f = fields(&line, sep);
        let Some(doc) = f.next() else { continue };
        let grade = f
            .next()
            .map(|g| parse_gain(n, g).map(Grade::Gain))
            .transpose()?;
        if condensed && grade.is_none() {
            continue;
        }
        out.push(SystemEntry::new(doc, grade));
    }
    Ok(out)
}

/// `<doc> [L<n>]` per line; a trailing class id is ignored.
pub fn level_labelled<R: BufRead>(reader: R, sep: &str) -> Result<Vec<SystemEntry>> {
    let mut out = vec![];
    for line in content_lines(reader) {
        let (_, line) = line?;
        let mut f = fields(&line, sep);
        let Some(doc) = f.next() else { continue };
        let grade = f.next().map(parse_label).transpose()?.map(Grade::Level);
        out.push(SystemEntry::new(doc, grade));
    }
    Ok(out)
}
