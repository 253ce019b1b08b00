//! On-disk snapshot cache with a freshness TTL.
//!
//! Each entry is a body file plus a timestamp file; an entry is served only
//! while it is younger than the configured maximum age. Anything unreadable
//! counts as a miss, never an error — the caller falls through to a fresh
//! download.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use hauler_core::Result;

/// File-pair cache for downloaded snapshots.
pub struct SnapshotCache {
    dir: PathBuf,
    max_age: Duration,
}

impl SnapshotCache {
    /// Create a cache rooted at `dir` with the given TTL.
    pub fn new(dir: impl Into<PathBuf>, max_age_minutes: i64) -> Self {
        Self {
            dir: dir.into(),
            max_age: Duration::minutes(max_age_minutes),
        }
    }

    fn body_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    fn stamp_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.timestamp"))
    }

    /// Load a cached body if it is younger than the TTL as of `now`.
    pub fn load(&self, name: &str, now: DateTime<Utc>) -> Option<String> {
        let stamp = fs::read_to_string(self.stamp_path(name)).ok()?;
        let cached_at: DateTime<Utc> = stamp.trim().parse().ok()?;
        let age = now.signed_duration_since(cached_at);
        if age > self.max_age {
            debug!(name, age_minutes = age.num_minutes(), "cache entry expired");
            return None;
        }
        match fs::read_to_string(self.body_path(name)) {
            Ok(body) => {
                debug!(name, age_minutes = age.num_minutes(), "cache hit");
                Some(body)
            }
            Err(err) => {
                warn!(name, %err, "cache body unreadable");
                None
            }
        }
    }

    /// Store a body stamped with `now`.
    pub fn store(&self, name: &str, body: &str, now: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.body_path(name), body)?;
        fs::write(self.stamp_path(name), now.to_rfc3339())?;
        Ok(())
    }
}
