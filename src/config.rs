//! Harness configuration.
//!
//! A single [`AppConfig`] value is built at startup and handed to every
//! component by reference. Tool locations, pattern lengths, the repetition
//! count, the per-invocation deadline and the index variants all live here so
//! tests can point the pipeline at fake executables.

use crate::bench::IndexVariant;
use crate::cache::CacheMode;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "stpd-bench";
const CONFIG_FILE: &str = "config.json";

/// Locations of the external executables, relative to `base_dir` unless absolute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// Prefix-free parsing of the input text
    pub parse: PathBuf,
    /// BWT of the parse
    pub parse_bwt: PathBuf,
    /// BWT and full suffix array of the text
    pub text_bwt: PathBuf,
    /// Locate tool for the constructed index
    pub locate_stpd: PathBuf,
    /// Locate tool for the competitor r-index
    pub locate_ri: PathBuf,
    /// File removal program used by cleanup
    pub remove: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            parse: PathBuf::from("pfp-src/pscan"),
            parse_bwt: PathBuf::from("pfp-src/bwtparse"),
            text_bwt: PathBuf::from("pfp-src/pfbwt"),
            locate_stpd: PathBuf::from("build/sources/stpd-index-src/locate"),
            locate_ri: PathBuf::from("experiments/original-r-index/build/ri-locate"),
            remove: PathBuf::from("rm"),
        }
    }
}

impl ToolPaths {
    /// Resolve every tool against `base`.
    ///
    /// Bare program names (no directory component) are left alone so they
    /// are looked up on `PATH`.
    pub fn resolve(&self, base: &Path) -> ToolPaths {
        let join = |p: &PathBuf| {
            if p.is_absolute() || p.components().count() <= 1 {
                p.clone()
            } else {
                base.join(p)
            }
        };

        ToolPaths {
            parse: join(&self.parse),
            parse_bwt: join(&self.parse_bwt),
            text_bwt: join(&self.text_bwt),
            locate_stpd: join(&self.locate_stpd),
            locate_ri: join(&self.locate_ri),
            remove: join(&self.remove),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory that relative tool paths and the benchmark log directory resolve against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub tools: ToolPaths,

    /// Pattern lengths benchmarked, in order
    #[serde(default = "default_pattern_lengths")]
    pub pattern_lengths: Vec<usize>,

    /// Repetitions averaged into each CSV row
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    /// Deadline for every external invocation; `None` waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,

    /// Constructed-index variants evaluated by `--locate-stpd`
    #[serde(default = "default_variants")]
    pub variants: Vec<IndexVariant>,

    /// File suffix of the competitor index
    #[serde(default = "default_competitor_suffix")]
    pub competitor_suffix: String,

    #[serde(default)]
    pub cache_mode: CacheMode,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_pattern_lengths() -> Vec<usize> {
    vec![100, 1000, 10000, 10]
}

fn default_repetitions() -> u32 {
    1
}

fn default_timeout_secs() -> Option<u64> {
    Some(86_400) // 24h
}

fn default_variants() -> Vec<IndexVariant> {
    vec![
        IndexVariant::new(".colex-_v0", None),
        IndexVariant::new(".colex-_v1", Some("v1")),
        IndexVariant::new(".colex-_v2", Some("v2")),
    ]
}

fn default_competitor_suffix() -> String {
    ".ri".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            tools: ToolPaths::default(),
            pattern_lengths: default_pattern_lengths(),
            repetitions: default_repetitions(),
            timeout_secs: default_timeout_secs(),
            variants: default_variants(),
            competitor_suffix: default_competitor_suffix(),
            cache_mode: CacheMode::default(),
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present, otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::read_from(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                let config = Self::read_from(&path)?;
                return Ok((config, ConfigSource::UserFile(path)));
            }
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Read and validate a config file
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            bail!("repetitions must be at least 1");
        }
        if self.pattern_lengths.is_empty() {
            bail!("pattern_lengths must not be empty");
        }
        if self.pattern_lengths.contains(&0) {
            bail!("pattern lengths must be positive");
        }
        if self.timeout_secs == Some(0) {
            bail!("timeout_secs must be positive (use null to disable the deadline)");
        }
        Ok(())
    }

    /// Tool paths resolved against `base_dir`
    pub fn resolved_tools(&self) -> ToolPaths {
        self.tools.resolve(&self.base_dir)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Per-user config location (`~/.config/stpd-bench/config.json` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.pattern_lengths, vec![100, 1000, 10000, 10]);
        assert_eq!(config.repetitions, 1);
        assert_eq!(config.timeout(), Some(Duration::from_secs(86_400)));
        assert_eq!(config.variants.len(), 3);
        assert_eq!(config.competitor_suffix, ".ri");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_partial_json() {
        let json = r#"{"repetitions": 3, "tools": {"parse": "/opt/pfp/pscan"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.repetitions, 3);
        assert_eq!(config.tools.parse, PathBuf::from("/opt/pfp/pscan"));
        // untouched tools keep their defaults
        assert_eq!(config.tools.parse_bwt, PathBuf::from("pfp-src/bwtparse"));
        assert_eq!(config.pattern_lengths, vec![100, 1000, 10000, 10]);
    }

    #[test]
    fn test_app_config_null_timeout() {
        let config: AppConfig = serde_json::from_str(r#"{"timeout_secs": null}"#).unwrap();
        assert_eq!(config.timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.repetitions = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pattern_lengths.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pattern_lengths = vec![10, 0];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_tools() {
        let tools = ToolPaths::default().resolve(Path::new("/work"));
        assert_eq!(tools.parse, PathBuf::from("/work/pfp-src/pscan"));
        assert_eq!(tools.remove, PathBuf::from("rm"));

        let mut custom = ToolPaths::default();
        custom.locate_ri = PathBuf::from("/usr/local/bin/ri-locate");
        let tools = custom.resolve(Path::new("/work"));
        assert_eq!(tools.locate_ri, PathBuf::from("/usr/local/bin/ri-locate"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.repetitions = 5;
        config.save(&path).unwrap();

        let (loaded, source) = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.repetitions, 5);
        assert_eq!(source, ConfigSource::Explicit(path));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.json"))).is_err());
    }
}
