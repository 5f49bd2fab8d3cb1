use crate::config::AppConfig;
use crate::output;
use crate::pipeline::orchestrator::{PipelineOrchestrator, PipelineOutcome};
use crate::pipeline::stage::BuildParams;
use crate::runner::ProcessRunner;
use anyhow::{Context, Result};

/// Run the construction pipeline for `params`, logging tool output to
/// `<input>.stpd-sampling.log`
pub fn build_index(config: &AppConfig, params: &BuildParams, progress: bool) -> Result<PipelineOutcome> {
    let log_path = params.log_path();
    println!("Sending logging messages to file: {}", log_path.display());

    let mut runner = ProcessRunner::open(&log_path, config.timeout())
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    println!("Computing the BWT and SA of: {}", params.input.display());
    let outcome = PipelineOrchestrator::new(&mut runner, config.resolved_tools(), params.clone())
        .with_progress(progress)
        .run();

    if outcome.succeeded() {
        println!("Output basepath: {}", params.output.display());
    }
    output::print_total_elapsed(outcome.elapsed);

    Ok(outcome)
}
