use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};

/// Width of the `name=` column in rendered metric lines
const NAME_WIDTH: usize = 21;

/// A metric name, optionally qualified by a rank cutoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetricKey {
    pub name: &'static str,
    pub cutoff: Option<usize>,
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cutoff {
            Some(k) => write!(f, "{}@{k:04}", self.name),
            None => f.write_str(self.name),
        }
    }
}

/// Metric values for one topic, in insertion order, plus the diagnostic
/// counters printed ahead of them.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricReport {
    pub syslen: usize,
    /// jrel
    pub relevant: usize,
    /// jnonrel
    pub nonrelevant: usize,
    /// r1
    pub first_relevant: usize,
    /// rp
    pub preferred: usize,
    entries: Vec<(MetricKey, f64)>,
}

impl MetricReport {
    pub fn new(
        syslen: usize,
        relevant: usize,
        nonrelevant: usize,
        first_relevant: usize,
        preferred: usize,
    ) -> Self {
        Self {
            syslen,
            relevant,
            nonrelevant,
            first_relevant,
            preferred,
            entries: vec![],
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, cutoff: Option<usize>, value: f64) {
        self.entries.push((MetricKey { name, cutoff }, value));
    }

    pub fn get(&self, name: &str, cutoff: Option<usize>) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.name == name && k.cutoff == cutoff)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &[(MetricKey, f64)] {
        &self.entries
    }

    /// `<prefix> # syslen=<n> jrel=<R> jnonrel=<N>`
    pub fn summary_line(&self, prefix: &str) -> String {
        format!(
            "{prefix} # syslen={} jrel={} jnonrel={}",
            self.syslen, self.relevant, self.nonrelevant
        )
    }

    /// `<prefix> # r1=<r1> rp=<rp>`
    pub fn positions_line(&self, prefix: &str) -> String {
        format!(
            "{prefix} # r1={} rp={}",
            self.first_relevant, self.preferred
        )
    }

    pub fn metric_lines(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, value)| {
                let name = format!("{key}=");
                format!("{prefix} {name:<width$}{value:.4}", width = NAME_WIDTH)
            })
            .collect()
    }

    /// The whole text report, one line per entry.
    pub fn render(&self, prefix: &str) -> String {
        let mut lines = vec![self.summary_line(prefix), self.positions_line(prefix)];
        lines.extend(self.metric_lines(prefix));
        lines.push(String::new());
        lines.join("\n")
    }
}

impl serde::Serialize for MetricReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MetricReport", 6)?;
        s.serialize_field("syslen", &self.syslen)?;
        s.serialize_field("jrel", &self.relevant)?;
        s.serialize_field("jnonrel", &self.nonrelevant)?;
        s.serialize_field("r1", &self.first_relevant)?;
        s.serialize_field("rp", &self.preferred)?;
        s.serialize_field("metrics", &OrderedMetrics(&self.entries))?;
        s.end()
    }
}

struct OrderedMetrics<'a>(&'a [(MetricKey, f64)]);

impl serde::Serialize for OrderedMetrics<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}
