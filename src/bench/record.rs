//! Benchmark rows and the CSV / `.res` sinks they are written to

use crate::bench::report::{Metric, MetricValues};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column order of the CSV report
pub const CSV_HEADER: &str = "index,dataset,dataset size,pattern length,no. patterns,total occurrences,time,time per pattern,time per character,time per occurrence,memory peak,first phase,second phase,perc second phase";

/// One CSV row: averaged metrics for a (pattern length, index) combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub index: String,
    pub dataset: String,
    pub dataset_size: u64,
    pub pattern_length: usize,
    pub patterns: u64,
    pub total_occurrences: f64,
    pub time: f64,
    pub time_per_pattern: f64,
    pub time_per_character: f64,
    pub time_per_occurrence: f64,
    pub memory_peak: f64,
    pub first_phase: f64,
    pub second_phase: f64,
    pub second_phase_percentage: f64,
}

/// The identifying columns of a row
#[derive(Debug, Clone)]
pub struct RecordKey {
    pub index: String,
    pub dataset: String,
    pub dataset_size: u64,
    pub pattern_length: usize,
    pub patterns: u64,
}

impl BenchmarkRecord {
    /// Average `totals` over `repetitions`; total time is rounded to two decimals
    pub fn from_totals(key: RecordKey, totals: &MetricValues, repetitions: u32) -> Self {
        let avg = totals.divided_by(f64::from(repetitions));
        Self {
            index: key.index,
            dataset: key.dataset,
            dataset_size: key.dataset_size,
            pattern_length: key.pattern_length,
            patterns: key.patterns,
            total_occurrences: avg[Metric::Occurrences],
            time: round2(avg[Metric::TotalTime]),
            time_per_pattern: avg[Metric::TimePerPattern],
            time_per_character: avg[Metric::TimePerCharacter],
            time_per_occurrence: avg[Metric::TimePerOccurrence],
            memory_peak: avg[Metric::PeakMemory],
            first_phase: avg[Metric::FirstPhase],
            second_phase: avg[Metric::SecondPhase],
            second_phase_percentage: avg[Metric::SecondPhasePercentage],
        }
    }

    /// The record as a CSV line (no trailing newline)
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&self.index),
            csv_field(&self.dataset),
            self.dataset_size,
            self.pattern_length,
            self.patterns,
            self.total_occurrences,
            self.time,
            self.time_per_pattern,
            self.time_per_character,
            self.time_per_occurrence,
            self.memory_peak,
            self.first_phase,
            self.second_phase,
            self.second_phase_percentage,
        )
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Quote a field that would otherwise break the row
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// CSV table plus a JSON-lines copy of every record.
///
/// Both files are truncated on creation; each row is flushed as soon as it
/// is written so a crashed run keeps the rows finished so far.
pub struct ReportSink {
    csv: BufWriter<File>,
    res: BufWriter<File>,
    rows: usize,
}

impl ReportSink {
    pub fn create(csv_path: &Path, res_path: &Path) -> Result<Self> {
        let csv = File::create(csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let res = File::create(res_path)
            .with_context(|| format!("Failed to create {}", res_path.display()))?;

        let mut sink = Self {
            csv: BufWriter::new(csv),
            res: BufWriter::new(res),
            rows: 0,
        };
        writeln!(sink.csv, "{}", CSV_HEADER)?;
        sink.csv.flush()?;
        Ok(sink)
    }

    pub fn write(&mut self, record: &BenchmarkRecord) -> Result<()> {
        writeln!(self.csv, "{}", record.csv_row())?;
        self.csv.flush()?;

        serde_json::to_writer(&mut self.res, record).context("Failed to serialize record")?;
        writeln!(self.res)?;
        self.res.flush()?;

        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::report::RI_LOCATE_V1;
    use crate::bench::report::fixtures::RI_REPORT;
    use std::fs;

    fn key() -> RecordKey {
        RecordKey {
            index: "ri".to_string(),
            dataset: "data/g.txt".to_string(),
            dataset_size: 1_000_000,
            pattern_length: 100,
            patterns: 1000,
        }
    }

    #[test]
    fn test_header_has_fourteen_columns() {
        assert_eq!(CSV_HEADER.split(',').count(), 14);
        assert!(CSV_HEADER.starts_with("index,dataset,dataset size"));
    }

    #[test]
    fn test_record_from_single_run() {
        let values = RI_LOCATE_V1.parse(RI_REPORT).unwrap();
        let record = BenchmarkRecord::from_totals(key(), &values, 1);

        assert_eq!(record.total_occurrences, 4200.0);
        assert_eq!(record.time, 0.75);
        assert_eq!(record.memory_peak, 123456.0);
        assert_eq!(
            record.csv_row(),
            "ri,data/g.txt,1000000,100,1000,4200,0.75,750000,7500,178571,123456,0.25,0.5,66.6667"
        );
        assert_eq!(record.csv_row().split(',').count(), 14);
    }

    #[test]
    fn test_record_averages_repetitions() {
        let mut totals = MetricValues::default();
        let mut run = MetricValues::default();
        run.set(Metric::TotalTime, 1.0);
        run.set(Metric::Occurrences, 10.0);
        totals += &run;
        run.set(Metric::TotalTime, 2.333);
        run.set(Metric::Occurrences, 20.0);
        totals += &run;

        let record = BenchmarkRecord::from_totals(key(), &totals, 2);
        assert_eq!(record.total_occurrences, 15.0);
        assert_eq!(record.time, 1.67);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_sink_truncates_and_writes_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("g.csv");
        let res = dir.path().join("g.res");
        let record = BenchmarkRecord::from_totals(key(), &MetricValues::default(), 1);

        for _ in 0..2 {
            let mut sink = ReportSink::create(&csv, &res).unwrap();
            sink.write(&record).unwrap();
            assert_eq!(sink.rows(), 1);
        }

        let content = fs::read_to_string(&csv).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(content.matches("index,dataset").count(), 1);

        let res_content = fs::read_to_string(&res).unwrap();
        assert_eq!(res_content.lines().count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(res_content.trim()).unwrap();
        assert_eq!(parsed["index"], "ri");
        assert_eq!(parsed["pattern_length"], 100);
    }
}
