//! Pattern files and dataset sizing

use crate::pipeline::stage::with_suffix;
use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A FASTA-style pattern file for one (input, pattern length) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    pub path: PathBuf,
    pub length: usize,
}

impl PatternSet {
    /// `<input>.pat<length>.fasta`
    pub fn for_input(input: &Path, length: usize) -> Self {
        Self {
            path: with_suffix(input, &format!(".pat{}.fasta", length)),
            length,
        }
    }

    /// Number of patterns in the file (two lines per pattern)
    pub fn count(&self) -> Result<u64> {
        let lines = count_lines(&self.path)?;
        Ok(pattern_count(lines))
    }
}

/// Patterns for `raw_lines` lines: header + sequence per pattern, odd counts rounded up
pub fn pattern_count(raw_lines: u64) -> u64 {
    (raw_lines + raw_lines % 2) / 2
}

/// Count newline bytes, as `wc -l` does
pub fn count_lines(path: &Path) -> Result<u64> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open pattern file {}", path.display()))?;
    let meta = file.metadata()?;
    if !meta.is_file() {
        bail!("pattern file {} is not a regular file", path.display());
    }
    let len = meta.len();
    if len == 0 {
        return Ok(0);
    }

    // SAFETY: the file is opened read-only and only scanned for newlines
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map pattern file {}", path.display()))?;
    Ok(memchr::memchr_iter(b'\n', &mmap).count() as u64)
}

/// Size of the dataset in bytes
pub fn dataset_size(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    Ok(meta.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_count_rounding() {
        assert_eq!(pattern_count(7), 4);
        assert_eq!(pattern_count(8), 4);
        assert_eq!(pattern_count(0), 0);
        assert_eq!(pattern_count(1), 1);
    }

    #[test]
    fn test_pattern_file_name() {
        let set = PatternSet::for_input(Path::new("data/g.txt"), 100);
        assert_eq!(set.path, PathBuf::from("data/g.txt.pat100.fasta"));
    }

    #[test]
    fn test_count_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("g.txt");

        let seven = PatternSet::for_input(&input, 10);
        fs::write(&seven.path, ">p1\nACGT\n>p2\nCCGT\n>p3\nTTGA\n>p4\n").unwrap();
        assert_eq!(count_lines(&seven.path).unwrap(), 7);
        assert_eq!(seven.count().unwrap(), 4);

        let eight = PatternSet::for_input(&input, 4);
        fs::write(&eight.path, ">p1\nACGT\n>p2\nCCGT\n>p3\nTTGA\n>p4\nGGGG\n").unwrap();
        assert_eq!(eight.count().unwrap(), 4);
    }

    #[test]
    fn test_empty_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.fasta");
        fs::write(&empty, b"").unwrap();
        assert_eq!(count_lines(&empty).unwrap(), 0);
        assert!(count_lines(&dir.path().join("missing.fasta")).is_err());
    }

    #[test]
    fn test_directory_is_not_a_pattern_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = count_lines(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_dataset_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("g.txt");
        fs::write(&input, vec![b'A'; 1234]).unwrap();
        assert_eq!(dataset_size(&input).unwrap(), 1234);
    }
}
