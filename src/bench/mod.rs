//! Locate-query benchmark harness.
//!
//! - [`variant`] - constructed-index flavours and their locate flags
//! - [`patterns`] - pattern files and dataset sizing
//! - [`report`] - versioned layouts of the locate tools' reports
//! - [`record`] - CSV rows and their sinks
//! - [`harness`] - the measurement loop

pub mod harness;
pub mod patterns;
pub mod record;
pub mod report;
pub mod variant;

pub use harness::{BenchOutputs, BenchPlan, BenchSummary, BenchmarkHarness, HarnessError, run_benchmarks};
pub use patterns::PatternSet;
pub use record::{BenchmarkRecord, CSV_HEADER, ReportSink};
pub use report::{Metric, MetricValues, RI_LOCATE_V1, ReportError, ReportSchema, STPD_LOCATE_V1};
pub use variant::IndexVariant;
