//! Repeated locate-query runs across pattern lengths and index variants.
//!
//! For every pattern length the harness evaluates the enabled index families:
//! each constructed-index variant (`--locate-stpd`) and the competitor
//! r-index (`--locate-ri`). A combination is measured `repetitions` times
//! with the file cache normalised before each run; the parsed reports are
//! averaged into one [`BenchmarkRecord`]. A failing combination is reported
//! and skipped, and the run moves on to the next one.

use crate::bench::patterns::{PatternSet, dataset_size};
use crate::bench::record::{BenchmarkRecord, RecordKey, ReportSink};
use crate::bench::report::{MetricValues, RI_LOCATE_V1, ReportError, ReportSchema, STPD_LOCATE_V1};
use crate::cache::{FileCache, normalize_or_report, system_cache};
use crate::config::{AppConfig, ToolPaths};
use crate::output;
use crate::pipeline::stage::with_suffix;
use crate::runner::{CommandRunner, ProcessRunner, RunError, ToolCommand};
use crate::utils::format_size;
use crate::utils::progress::tool_spinner;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// What to benchmark
#[derive(Debug, Clone)]
pub struct BenchPlan {
    pub input: PathBuf,
    /// Evaluate the constructed index variants
    pub locate_stpd: bool,
    /// Evaluate the competitor r-index
    pub locate_ri: bool,
}

/// Why a combination produced no row
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("index file {} not found", .0.display())]
    MissingIndex(PathBuf),

    #[error("pattern file {} not found", .0.display())]
    MissingPatterns(PathBuf),

    #[error("cannot count patterns in {}: {reason}", path.display())]
    UnreadablePatterns { path: PathBuf, reason: String },

    #[error(transparent)]
    Tool(#[from] RunError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// A combination that was skipped
#[derive(Debug)]
pub struct Skipped {
    pub label: String,
    pub pattern_length: usize,
    pub error: HarnessError,
}

/// Totals for one harness run
#[derive(Debug, Default)]
pub struct BenchSummary {
    pub rows: usize,
    pub skipped: Vec<Skipped>,
}

/// One index to query: which file, which tool, which report layout
#[derive(Debug, Clone)]
pub struct LocateTarget {
    pub label: String,
    pub index_path: PathBuf,
    pub command: ToolCommand,
    pub schema: &'static ReportSchema,
}

/// Files written inside the log directory for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchOutputs {
    pub dir: PathBuf,
    pub log: PathBuf,
    pub res: PathBuf,
    pub csv: PathBuf,
}

impl BenchOutputs {
    /// `<base>/<logs_dir>/<input file name>.{log,res,csv}`
    pub fn new(base_dir: &Path, logs_dir: &Path, input: &Path) -> Self {
        let dir = base_dir.join(logs_dir);
        let name = input
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| input.as_os_str().to_os_string());
        let stem = dir.join(name);
        Self {
            log: with_suffix(&stem, ".log"),
            res: with_suffix(&stem, ".res"),
            csv: with_suffix(&stem, ".csv"),
            dir,
        }
    }
}

/// Drives locate runs and writes one record per combination
pub struct BenchmarkHarness<'a, R: CommandRunner> {
    config: &'a AppConfig,
    tools: ToolPaths,
    runner: &'a mut R,
    cache: &'a dyn FileCache,
    sink: &'a mut ReportSink,
    progress: bool,
}

impl<'a, R: CommandRunner> BenchmarkHarness<'a, R> {
    pub fn new(
        config: &'a AppConfig,
        runner: &'a mut R,
        cache: &'a dyn FileCache,
        sink: &'a mut ReportSink,
    ) -> Self {
        Self {
            config,
            tools: config.resolved_tools(),
            runner,
            cache,
            sink,
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// The indexes queried for one pattern set, in evaluation order
    pub fn targets(&self, plan: &BenchPlan, patterns: &PatternSet) -> Vec<LocateTarget> {
        let mut targets = Vec::new();

        if plan.locate_stpd {
            for variant in &self.config.variants {
                let index_path = variant.index_path(&plan.input);
                let command = variant.locate_args().into_iter().fold(
                    ToolCommand::new(&self.tools.locate_stpd)
                        .arg("-i")
                        .path_arg(&index_path)
                        .arg("-p")
                        .path_arg(&patterns.path),
                    |cmd, arg| cmd.arg(arg),
                );
                targets.push(LocateTarget {
                    label: variant.label().to_string(),
                    index_path,
                    command,
                    schema: &STPD_LOCATE_V1,
                });
            }
        }

        if plan.locate_ri {
            let index_path = with_suffix(&plan.input, &self.config.competitor_suffix);
            let command = ToolCommand::new(&self.tools.locate_ri)
                .path_arg(&index_path)
                .path_arg(&patterns.path);
            targets.push(LocateTarget {
                label: self.config.competitor_suffix.trim_start_matches('.').to_string(),
                index_path,
                command,
                schema: &RI_LOCATE_V1,
            });
        }

        targets
    }

    pub fn run(&mut self, plan: &BenchPlan) -> Result<BenchSummary> {
        let size = dataset_size(&plan.input)?;
        println!("Dataset size (in bytes) = {} ({})", size, format_size(size));

        let mut summary = BenchSummary::default();

        let config = self.config;
        for &length in &config.pattern_lengths {
            let patterns = PatternSet::for_input(&plan.input, length);
            println!("locating patterns in: {}", patterns.path.display());

            let targets = self.targets(plan, &patterns);

            if !patterns.path.exists() {
                output::print_error(&format!(
                    "pattern file {} not found, skipping length {}",
                    patterns.path.display(),
                    length
                ));
                skip_length(&mut summary, targets, length, || {
                    HarnessError::MissingPatterns(patterns.path.clone())
                });
                continue;
            }

            let count = match patterns.count() {
                Ok(count) => count,
                Err(e) => {
                    let reason = format!("{:#}", e);
                    output::print_error(&format!("{}, skipping length {}", reason, length));
                    skip_length(&mut summary, targets, length, || HarnessError::UnreadablePatterns {
                        path: patterns.path.clone(),
                        reason: reason.clone(),
                    });
                    continue;
                }
            };
            println!("No patterns = {}", count);

            for target in targets {
                let key = RecordKey {
                    index: target.label.clone(),
                    dataset: plan.input.display().to_string(),
                    dataset_size: size,
                    pattern_length: length,
                    patterns: count,
                };

                match self.measure(&target, &patterns, key) {
                    Ok(record) => self.sink.write(&record)?,
                    Err(error) => {
                        self.report_skip(&target, &error);
                        summary.skipped.push(Skipped {
                            label: target.label,
                            pattern_length: length,
                            error,
                        });
                    }
                }
            }
        }

        summary.rows = self.sink.rows();
        info!(rows = summary.rows, skipped = summary.skipped.len(), "benchmark finished");
        Ok(summary)
    }

    /// Run one combination `repetitions` times and average the reports
    fn measure(
        &mut self,
        target: &LocateTarget,
        patterns: &PatternSet,
        key: RecordKey,
    ) -> Result<BenchmarkRecord, HarnessError> {
        if !target.index_path.exists() {
            return Err(HarnessError::MissingIndex(target.index_path.clone()));
        }

        println!("##### {}", target.command);

        let repetitions = self.config.repetitions;
        let mut totals = MetricValues::default();

        for rep in 0..repetitions {
            normalize_or_report(self.cache, &target.index_path);
            normalize_or_report(self.cache, &patterns.path);

            let spinner = tool_spinner(
                &format!("{} / length {} ({}/{})", target.label, patterns.length, rep + 1, repetitions),
                self.progress,
            );
            let captured = self.runner.capture(&target.command);
            spinner.finish_and_clear();

            let values = target.schema.parse(&captured?)?;
            totals += &values;
        }

        Ok(BenchmarkRecord::from_totals(key, &totals, repetitions))
    }

    fn report_skip(&self, target: &LocateTarget, error: &HarnessError) {
        warn!(label = %target.label, error = %error, "combination skipped");
        match error {
            HarnessError::Tool(e) => {
                output::print_command_failure(&target.command.to_string(), self.runner.log_path(), e)
            }
            other => output::print_error(&other.to_string()),
        }
    }
}

/// Record every target of one pattern length as skipped
fn skip_length(
    summary: &mut BenchSummary,
    targets: Vec<LocateTarget>,
    length: usize,
    error: impl Fn() -> HarnessError,
) {
    for target in targets {
        summary.skipped.push(Skipped {
            label: target.label,
            pattern_length: length,
            error: error(),
        });
    }
}

/// Set up the log directory, sinks and runner, then run the harness
pub fn run_benchmarks(
    config: &AppConfig,
    plan: &BenchPlan,
    logs_dir: &Path,
    progress: bool,
) -> Result<(BenchOutputs, BenchSummary)> {
    let outputs = BenchOutputs::new(&config.base_dir, logs_dir, &plan.input);

    if !outputs.dir.exists() {
        fs::create_dir_all(&outputs.dir)
            .with_context(|| format!("Failed to create {}", outputs.dir.display()))?;
        println!("Logs directory created successfully!");
    }

    let mut runner = ProcessRunner::open(&outputs.log, config.timeout())
        .with_context(|| format!("Failed to open log file {}", outputs.log.display()))?;
    let mut sink = ReportSink::create(&outputs.csv, &outputs.res)?;
    let cache = system_cache(config.cache_mode);

    let summary = BenchmarkHarness::new(config, &mut runner, cache.as_ref(), &mut sink)
        .with_progress(progress)
        .run(plan)?;

    Ok((outputs, summary))
}
