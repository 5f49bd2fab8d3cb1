//! Page-cache normalisation before timed runs.
//!
//! Before each measurement the index and pattern files are synced and the
//! kernel is advised to drop their cached pages, then (by default) to read
//! them back in, so every repetition starts from the same cache state.

use crate::output;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::debug;

/// Which advisories are issued for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// DONTNEED followed by WILLNEED over the whole file
    #[default]
    EvictThenPrefetch,
    /// DONTNEED only: measure against a cold cache
    Evict,
    /// Leave the cache alone
    Off,
}

/// Capability to put a file's cached pages into a known state
pub trait FileCache {
    fn normalize(&self, path: &Path) -> io::Result<()>;
}

/// Does nothing. Used on platforms without `posix_fadvise` and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl FileCache for NoopCache {
    fn normalize(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// `fdatasync` + `posix_fadvise` implementation
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
#[derive(Debug, Clone, Copy)]
pub struct FadviseCache {
    mode: CacheMode,
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
impl FadviseCache {
    pub fn new(mode: CacheMode) -> Self {
        Self { mode }
    }

    fn advise(file: &std::fs::File, len: u64, advice: libc::c_int) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let len = libc::off_t::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file too large to advise"))?;
        // posix_fadvise returns the error number instead of setting errno
        let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, len, advice) };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        Ok(())
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
impl FileCache for FadviseCache {
    fn normalize(&self, path: &Path) -> io::Result<()> {
        if self.mode == CacheMode::Off {
            return Ok(());
        }

        let file = std::fs::File::open(path)?;
        let len = file.metadata()?.len();

        file.sync_data()?;
        Self::advise(&file, len, libc::POSIX_FADV_DONTNEED)?;
        if self.mode == CacheMode::EvictThenPrefetch {
            Self::advise(&file, len, libc::POSIX_FADV_WILLNEED)?;
        }

        debug!(path = %path.display(), len, mode = ?self.mode, "cache normalized");
        Ok(())
    }
}

/// The platform's cache implementation for `mode`
pub fn system_cache(mode: CacheMode) -> Box<dyn FileCache> {
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    {
        Box::new(FadviseCache::new(mode))
    }

    #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
    {
        if mode != CacheMode::Off {
            tracing::warn!("posix_fadvise unavailable on this platform, cache left as is");
        }
        Box::new(NoopCache)
    }
}

/// Normalise `path`, reporting any error and carrying on
pub fn normalize_or_report(cache: &dyn FileCache, path: &Path) {
    if let Err(e) = cache.normalize(path) {
        output::print_warning(&format!("An error occurred: {} ({})", e, path.display()));
    }
}
