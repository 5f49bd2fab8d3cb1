use crate::pipeline::stage::with_suffix;
use std::path::{Path, PathBuf};

/// Aggregate files written by parsing and the BWT of the parse
const PARSE_SUFFIXES: [&str; 7] = [
    ".parse_old",
    ".parse",
    ".dict",
    ".occ",
    ".last",
    ".bwlast",
    ".ilist",
];

/// Per-thread shards of the parse, `<input>.<i>.<suffix>`
const PARSE_SHARD_SUFFIXES: [&str; 2] = [".parse_old", ".last"];

/// Aggregate suffix-array sampling files
const SA_SUFFIXES: [&str; 2] = [".sai", ".bwsai"];

/// Per-thread shards of the sampling files
const SA_SHARD_SUFFIXES: [&str; 1] = [".sai"];

/// Intermediate construction files for one input, keyed by basename and thread index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    input: PathBuf,
    threads: u32,
}

impl ArtifactSet {
    pub fn new(input: &Path, threads: u32) -> Self {
        Self {
            input: input.to_path_buf(),
            threads,
        }
    }

    /// Files grouped in the order they are deleted, one removal command per group
    pub fn deletion_batches(&self) -> Vec<Vec<PathBuf>> {
        let mut batches = Vec::with_capacity(2 + 2 * self.threads as usize);

        batches.push(self.aggregate(&PARSE_SUFFIXES));
        for i in 0..self.threads {
            batches.push(self.shard(i, &PARSE_SHARD_SUFFIXES));
        }

        batches.push(self.aggregate(&SA_SUFFIXES));
        for i in 0..self.threads {
            batches.push(self.shard(i, &SA_SHARD_SUFFIXES));
        }

        batches
    }

    /// Every artifact path
    pub fn paths(&self) -> Vec<PathBuf> {
        self.deletion_batches().into_iter().flatten().collect()
    }

    fn aggregate(&self, suffixes: &[&str]) -> Vec<PathBuf> {
        suffixes.iter().map(|s| with_suffix(&self.input, s)).collect()
    }

    fn shard(&self, thread: u32, suffixes: &[&str]) -> Vec<PathBuf> {
        suffixes
            .iter()
            .map(|s| with_suffix(&self.input, &format!(".{}{}", thread, s)))
            .collect()
    }
}
