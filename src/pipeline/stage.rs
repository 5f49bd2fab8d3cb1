use crate::config::ToolPaths;
use crate::runner::ToolCommand;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Parameters shared by every construction stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    pub input: PathBuf,
    /// Output basepath, defaults to the input path
    pub output: PathBuf,
    /// PFP sliding window size
    pub window: u32,
    /// PFP hash modulus
    pub modulus: u32,
    pub threads: u32,
}

impl BuildParams {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        Self {
            output: input.clone(),
            input,
            window: 10,
            modulus: 100,
            threads: 1,
        }
    }

    /// Path of the shared construction log, `<input>.stpd-sampling.log`
    pub fn log_path(&self) -> PathBuf {
        with_suffix(&self.input, ".stpd-sampling.log")
    }
}

/// A construction stage, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Prefix-free parsing: dictionary and parse
    Parse,
    /// BWT of the parse
    ParseBwt,
    /// BWT and full suffix array of the text
    TextBwtSa,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Parse, Stage::ParseBwt, Stage::TextBwtSa];

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Parse => "Parsing",
            Stage::ParseBwt => "Parse's BWT computation",
            Stage::TextBwtSa => "Text's BWT and SA computation",
        }
    }

    /// The command line this stage runs
    pub fn command(&self, tools: &ToolPaths, params: &BuildParams) -> ToolCommand {
        match self {
            Stage::Parse => ToolCommand::new(&tools.parse)
                .path_arg(&params.input)
                .arg("-w")
                .arg(params.window.to_string())
                .arg("-p")
                .arg(params.modulus.to_string())
                .arg("-t")
                .arg(params.threads.to_string())
                .arg("-s"),
            Stage::ParseBwt => ToolCommand::new(&tools.parse_bwt)
                .path_arg(&params.input)
                .arg("-t")
                .arg(params.threads.to_string())
                .arg("-s"),
            // -S: compute the full suffix array
            Stage::TextBwtSa => ToolCommand::new(&tools.text_bwt)
                .path_arg(&params.input)
                .arg("-w")
                .arg(params.window.to_string())
                .arg("-t")
                .arg(params.threads.to_string())
                .arg("-S"),
        }
    }
}

/// One executed stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRun {
    pub stage: Stage,
    pub command: ToolCommand,
    pub succeeded: bool,
}

/// `path` with `suffix` appended to its final component (`g.txt` -> `g.txt.parse`)
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
