//! Three-stage index construction.
//!
//! - [`stage`] - the construction stages and the commands they issue
//! - [`artifacts`] - intermediate files left behind by the stages
//! - [`orchestrator`] - fail-fast sequencing and cleanup
//! - [`build`] - entry point wiring the orchestrator to a process runner

pub mod artifacts;
pub mod build;
pub mod orchestrator;
pub mod stage;

pub use artifacts::ArtifactSet;
pub use build::build_index;
pub use orchestrator::{CleanupReport, PipelineOrchestrator, PipelineOutcome, PipelineState};
pub use stage::{BuildParams, Stage, StageRun};
