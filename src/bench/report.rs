//! Locate-tool report parsing.
//!
//! The locate tools print a fixed block of `label = value unit` lines after
//! loading the index. A [`ReportSchema`] pins down one version of that block:
//! the anchor line where it starts, its exact whitespace-separated token
//! count, and the token position of every metric. Reports that do not match
//! are rejected with a [`ReportError`] instead of yielding shifted values.
//!
//! Both tools emit the same block (token positions from the anchor):
//!
//! ```text
//! Memory peak while running pattern matching queries = <8> bytes
//! Elapsed time while running pattern matching queries = <18> sec
//! Total number of occurrences found = <26>
//! Number of patterns = N, Total number of characters = C
//! Elapsed time per pattern = <43> nanoSec
//! Elapsed time per character = <50> nanoSec
//! Elapsed time per occurrence = <57> nanoSec
//! <first phase line> = <value> sec
//! Elapsed time running phi queries = <value> sec
//! Percentage time taken for running the phi queries = <value>%
//! ```
//!
//! The STPD `locate` block differs in its last three lines: the first-phase
//! label is four words longer and the phi-query line reads
//! `Elapsed time running the phi queries`, so its tail sits at 79 and 90.

use std::ops::{AddAssign, Index};
use thiserror::Error;

/// Metrics extracted from a locate report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PeakMemory,
    TotalTime,
    Occurrences,
    TimePerPattern,
    TimePerCharacter,
    TimePerOccurrence,
    FirstPhase,
    SecondPhase,
    SecondPhasePercentage,
}

impl Metric {
    pub const COUNT: usize = 9;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::PeakMemory,
        Metric::TotalTime,
        Metric::Occurrences,
        Metric::TimePerPattern,
        Metric::TimePerCharacter,
        Metric::TimePerOccurrence,
        Metric::FirstPhase,
        Metric::SecondPhase,
        Metric::SecondPhasePercentage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::PeakMemory => "memory peak",
            Metric::TotalTime => "time",
            Metric::Occurrences => "total occurrences",
            Metric::TimePerPattern => "time per pattern",
            Metric::TimePerCharacter => "time per character",
            Metric::TimePerOccurrence => "time per occurrence",
            Metric::FirstPhase => "first phase",
            Metric::SecondPhase => "second phase",
            Metric::SecondPhasePercentage => "perc second phase",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Where one metric sits in the report
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub metric: Metric,
    pub token: usize,
    /// Unit glued to the number, stripped before parsing (`%`)
    pub strip: Option<&'static str>,
}

const fn field(metric: Metric, token: usize) -> FieldSpec {
    FieldSpec {
        metric,
        token,
        strip: None,
    }
}

/// One supported version of a locate tool's report layout
#[derive(Debug, Clone, Copy)]
pub struct ReportSchema {
    pub name: &'static str,
    pub version: u32,
    /// Prefix of the first report line; earlier output is preamble
    pub anchor: &'static str,
    /// Exact token count from the anchor line to the end
    pub tokens: usize,
    pub fields: [FieldSpec; Metric::COUNT],
}

/// `ri-locate` from the reference r-index
pub const RI_LOCATE_V1: ReportSchema = ReportSchema {
    name: "ri-locate",
    version: 1,
    anchor: "Memory peak",
    tokens: 86,
    fields: [
        field(Metric::PeakMemory, 8),
        field(Metric::TotalTime, 18),
        field(Metric::Occurrences, 26),
        field(Metric::TimePerPattern, 43),
        field(Metric::TimePerCharacter, 50),
        field(Metric::TimePerOccurrence, 57),
        field(Metric::FirstPhase, 66),
        field(Metric::SecondPhase, 74),
        FieldSpec {
            metric: Metric::SecondPhasePercentage,
            token: 85,
            strip: Some("%"),
        },
    ],
};

/// `locate` for the constructed STPD index
pub const STPD_LOCATE_V1: ReportSchema = ReportSchema {
    name: "stpd-locate",
    version: 1,
    anchor: "Memory peak",
    tokens: 91,
    fields: [
        field(Metric::PeakMemory, 8),
        field(Metric::TotalTime, 18),
        field(Metric::Occurrences, 26),
        field(Metric::TimePerPattern, 43),
        field(Metric::TimePerCharacter, 50),
        field(Metric::TimePerOccurrence, 57),
        field(Metric::FirstPhase, 70),
        field(Metric::SecondPhase, 79),
        FieldSpec {
            metric: Metric::SecondPhasePercentage,
            token: 90,
            strip: Some("%"),
        },
    ],
};

/// A report that does not match its schema
#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("unexpected output format ({schema} v{version}): no line starting with '{anchor}'")]
    MissingAnchor {
        schema: &'static str,
        version: u32,
        anchor: &'static str,
    },

    #[error(
        "unexpected output format ({schema} v{version}): expected {expected} tokens, found {found}"
    )]
    TokenCount {
        schema: &'static str,
        version: u32,
        expected: usize,
        found: usize,
    },

    #[error(
        "unexpected output format ({schema} v{version}): {metric} at token {token} is not preceded by '='"
    )]
    Misaligned {
        schema: &'static str,
        version: u32,
        metric: &'static str,
        token: usize,
    },

    #[error("unexpected output format ({schema} v{version}): {metric} value '{value}' is not a number")]
    NotANumber {
        schema: &'static str,
        version: u32,
        metric: &'static str,
        value: String,
    },
}

/// Values of every [`Metric`], indexed by metric
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricValues([f64; Metric::COUNT]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.slot()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.slot()] = value;
    }

    /// Every value divided by `n`
    pub fn divided_by(&self, n: f64) -> MetricValues {
        MetricValues(self.0.map(|v| v / n))
    }
}

impl Index<Metric> for MetricValues {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.slot()]
    }
}

impl AddAssign<&MetricValues> for MetricValues {
    fn add_assign(&mut self, other: &MetricValues) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }
}

impl ReportSchema {
    /// Extract every metric from `output`
    pub fn parse(&self, output: &str) -> Result<MetricValues, ReportError> {
        let start = self
            .anchor_offset(output)
            .ok_or(ReportError::MissingAnchor {
                schema: self.name,
                version: self.version,
                anchor: self.anchor,
            })?;

        let tokens: Vec<&str> = output[start..].split_whitespace().collect();
        if tokens.len() != self.tokens {
            return Err(ReportError::TokenCount {
                schema: self.name,
                version: self.version,
                expected: self.tokens,
                found: tokens.len(),
            });
        }

        let mut values = MetricValues::default();
        for spec in &self.fields {
            if spec.token == 0 || tokens[spec.token - 1] != "=" {
                return Err(ReportError::Misaligned {
                    schema: self.name,
                    version: self.version,
                    metric: spec.metric.name(),
                    token: spec.token,
                });
            }

            let raw = tokens[spec.token];
            let trimmed = match spec.strip {
                Some(unit) => raw.strip_suffix(unit).unwrap_or(raw),
                None => raw,
            };
            let value = trimmed.parse::<f64>().map_err(|_| ReportError::NotANumber {
                schema: self.name,
                version: self.version,
                metric: spec.metric.name(),
                value: raw.to_string(),
            })?;
            values.set(spec.metric, value);
        }

        Ok(values)
    }

    /// Byte offset of the first line starting with the anchor
    fn anchor_offset(&self, output: &str) -> Option<usize> {
        let mut offset = 0;
        for line in output.split_inclusive('\n') {
            if line.trim_start().starts_with(self.anchor) {
                return Some(offset);
            }
            offset += line.len();
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A well-formed `ri-locate` report
    pub const RI_REPORT: &str = "\
Loading r-index
searching patterns in data/g.txt.pat100.fasta
Memory peak while running pattern matching queries = 123456 bytes
Elapsed time while running pattern matching queries = 0.75 sec
Total number of occurrences found = 4200
Number of patterns = 1000, Total number of characters = 100000
Elapsed time per pattern = 750000 nanoSec
Elapsed time per character = 7500 nanoSec
Elapsed time per occurrence = 178571 nanoSec
Elapsed time running backward search algorithm = 0.25 sec
Elapsed time running phi queries = 0.5 sec
Percentage time taken for running the phi queries = 66.6667%
";

    /// A well-formed STPD `locate` report
    pub const STPD_REPORT: &str = "\
### Querying DNA optimized ST colex index for data/g.txt.colex-_v1
Loading the STPD-array and the phi support structures from data/g.txt.colex-_v1 done in 0.01 sec
Memory peak while running pattern matching queries = 2048 bytes
Elapsed time while running pattern matching queries = 1.5 sec
Total number of occurrences found = 10
Number of patterns = 4, Total number of characters = 400
Elapsed time per pattern = 375000000 nanoSec
Elapsed time per character = 3750000 nanoSec
Elapsed time per occurrence = 150000000 nanoSec
Elapsed time running the backward search algorithm on the STPD-array = 0.5 sec
Elapsed time running the phi queries = 1 sec
Percentage time taken for running the phi queries = 66.6667%
";
}
