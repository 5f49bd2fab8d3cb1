//! # stpd-bench - STPD index build pipeline and locate benchmarks
//!
//! Drives the external tools that construct an STPD index from a text via
//! prefix-free parsing, then benchmarks locate queries on the resulting index
//! variants and on a reference r-index. No indexing happens in this crate:
//! it sequences tool invocations, manages the intermediate files, and turns
//! the tools' text reports into CSV rows.
//!
//! ## Architecture
//!
//! - [`config`] - the configuration value passed to every component
//! - [`runner`] - external command execution with a shared log and deadline
//! - [`cache`] - page-cache normalisation before timed runs
//! - [`pipeline`] - the three construction stages and cleanup
//! - [`bench`] - locate runs, report parsing, CSV output
//! - [`output`] - console messages
//! - [`utils`] - spinner and size formatting
//!
//! ## Example
//!
//! ```no_run
//! use stpd_bench::config::AppConfig;
//! use stpd_bench::pipeline::{BuildParams, build_index};
//!
//! let config = AppConfig::default();
//! let params = BuildParams { threads: 4, ..BuildParams::new("data/chr19.fa") };
//! let outcome = build_index(&config, &params, false)?;
//! assert!(outcome.succeeded());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bench;
pub mod cache;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod utils;
