use crate::pipeline::stage::with_suffix;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Flag that selects an optimized query path in the locate tool
pub const OPTIMIZATION_FLAG: &str = "-O";

/// One on-disk flavour of the constructed index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexVariant {
    /// File suffix appended to the input path, e.g. `.colex-_v1`
    pub suffix: String,
    /// Value passed after [`OPTIMIZATION_FLAG`]; `None` for the baseline
    #[serde(default)]
    pub optimization: Option<String>,
}

impl IndexVariant {
    pub fn new(suffix: &str, optimization: Option<&str>) -> Self {
        Self {
            suffix: suffix.to_string(),
            optimization: optimization.map(str::to_string),
        }
    }

    /// CSV label: the suffix without its leading dot (`colex-_v1`)
    pub fn label(&self) -> &str {
        self.suffix.trim_start_matches('.')
    }

    pub fn index_path(&self, input: &Path) -> PathBuf {
        with_suffix(input, &self.suffix)
    }

    /// Extra locate arguments for this variant
    pub fn locate_args(&self) -> Vec<String> {
        match &self.optimization {
            Some(opt) => vec![OPTIMIZATION_FLAG.to_string(), opt.clone()],
            None => Vec::new(),
        }
    }
}
