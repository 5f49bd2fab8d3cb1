//! Fail-fast sequencing of the construction stages.
//!
//! Each stage runs only if the previous one succeeded. Cleanup of the
//! intermediate files happens only after all three stages succeed; it issues
//! every deletion even when one fails and reports all failures together.

use crate::config::ToolPaths;
use crate::output;
use crate::pipeline::artifacts::ArtifactSet;
use crate::pipeline::stage::{BuildParams, Stage, StageRun};
use crate::runner::{CommandRunner, RunError, ToolCommand};
use crate::utils::progress::tool_spinner;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Parsing,
    BwtOfParse,
    TextBwtAndSa,
    CleaningUp,
    Done,
    Aborted,
}

impl PipelineState {
    fn running(stage: Stage) -> Self {
        match stage {
            Stage::Parse => PipelineState::Parsing,
            Stage::ParseBwt => PipelineState::BwtOfParse,
            Stage::TextBwtSa => PipelineState::TextBwtAndSa,
        }
    }
}

/// Deletion batches that could not be removed
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Removal commands issued
    pub issued: usize,
    pub failures: Vec<(ToolCommand, RunError)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of [`PipelineOrchestrator::run`]
#[derive(Debug)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    /// Every state entered, in order, starting with `NotStarted`
    pub transitions: Vec<PipelineState>,
    pub stages: Vec<StageRun>,
    /// `None` unless all stages succeeded
    pub cleanup: Option<CleanupReport>,
    pub elapsed: Duration,
}

impl PipelineOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Done && self.cleanup.as_ref().is_some_and(|c| c.is_clean())
    }

    /// The stage that aborted the run, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        self.stages.iter().find(|r| !r.succeeded).map(|r| r.stage)
    }
}

/// Runs [`Stage::ALL`] through a [`CommandRunner`], then cleans up
pub struct PipelineOrchestrator<'a, R: CommandRunner> {
    runner: &'a mut R,
    tools: ToolPaths,
    params: BuildParams,
    state: PipelineState,
    transitions: Vec<PipelineState>,
    progress: bool,
}

impl<'a, R: CommandRunner> PipelineOrchestrator<'a, R> {
    /// `tools` must already be resolved against the base directory
    pub fn new(runner: &'a mut R, tools: ToolPaths, params: BuildParams) -> Self {
        Self {
            runner,
            tools,
            params,
            state: PipelineState::NotStarted,
            transitions: vec![PipelineState::NotStarted],
            progress: false,
        }
    }

    /// Show a spinner while each tool runs
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn enter(&mut self, state: PipelineState) {
        info!(from = ?self.state, to = ?state, "pipeline transition");
        self.state = state;
        self.transitions.push(state);
    }

    pub fn run(mut self) -> PipelineOutcome {
        let start = Instant::now();
        let mut stages = Vec::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            self.enter(PipelineState::running(stage));

            let command = stage.command(&self.tools, &self.params);
            output::print_step(stage.title(), &command.to_string());

            let spinner = tool_spinner(stage.title(), self.progress);
            let succeeded = self.runner.execute(&command);
            spinner.finish_and_clear();

            stages.push(StageRun {
                stage,
                command,
                succeeded,
            });

            if !succeeded {
                warn!(?stage, "stage failed, aborting pipeline");
                self.enter(PipelineState::Aborted);
                return self.finish(stages, None, start);
            }
            output::print_elapsed(start.elapsed());
        }

        self.enter(PipelineState::CleaningUp);
        output::print_step("Deleting temporary files", "");
        let cleanup = self.cleanup();
        if !cleanup.is_clean() {
            warn!(failed = cleanup.failures.len(), "cleanup incomplete");
        }

        self.enter(PipelineState::Done);
        self.finish(stages, Some(cleanup), start)
    }

    /// Remove the intermediate files, one `rm -f` per batch.
    ///
    /// `-f` makes already-missing files a success, so cleanup can be re-run.
    fn cleanup(&mut self) -> CleanupReport {
        let artifacts = ArtifactSet::new(&self.params.input, self.params.threads);
        let mut report = CleanupReport::default();

        for batch in artifacts.deletion_batches() {
            let command = batch
                .iter()
                .fold(ToolCommand::new(&self.tools.remove).arg("-f"), |cmd, path| {
                    cmd.path_arg(path)
                });

            report.issued += 1;
            if let Err(e) = self.runner.run(&command) {
                output::print_command_failure(&command.to_string(), self.runner.log_path(), &e);
                report.failures.push((command, e));
            }
        }

        report
    }

    fn finish(
        self,
        stages: Vec<StageRun>,
        cleanup: Option<CleanupReport>,
        start: Instant,
    ) -> PipelineOutcome {
        PipelineOutcome {
            state: self.state,
            transitions: self.transitions,
            stages,
            cleanup,
            elapsed: start.elapsed(),
        }
    }
}
