//! Fingerprint-addressed artifact directories: reuse checks, publication,
//! retention.
//!
//! Publication goes through an advisory lock file plus a staging-directory
//! rename, so two processes targeting the same fingerprint cannot interleave
//! writes. The lock is advisory with stale takeover, not a hard guarantee.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CodegenError;
use crate::fingerprint::{HashInputs, HASH_PREFIX_LEN};
use crate::options::EffectiveOptions;

pub const DI_CONFIG_FILE: &str = "di-config.json";
pub const REGISTRY_FILE: &str = "AutoGeneratedRegistry.js";
pub const TRANSFORMED_DIR: &str = "transformed";
pub const META_FILE: &str = ".config-meta.json";

const LOCK_FILE: &str = ".wirec.lock";
const STALE_LOCK: Duration = Duration::from_secs(60);
const FRESHNESS_CAP: usize = 64;

/// Metadata recorded next to the generated files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMeta {
    pub hash: String,
    pub hash_inputs: HashInputs,
    pub generated_at: DateTime<Utc>,
    pub effective_options: EffectiveOptions,
}

/// Size-bounded "recently validated" memo so watch mode does not re-stat the
/// artifact directory on every file event
struct FreshnessMemo {
    entries: HashMap<String, Instant>,
    window: Duration,
}

impl FreshnessMemo {
    fn new(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    fn is_fresh(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|at| at.elapsed() < self.window)
    }

    fn mark(&mut self, name: &str) {
        if self.entries.len() >= FRESHNESS_CAP {
            self.entries.clear();
        }
        self.entries.insert(name.to_string(), Instant::now());
    }

    fn forget(&mut self, name: &str) {
        self.entries.remove(name);
    }
}

/// Manages `<output_root>/configs/` and the artifact directories inside it
pub struct ArtifactStore {
    configs_root: PathBuf,
    retention: usize,
    fresh: FreshnessMemo,
}

impl ArtifactStore {
    pub fn new(output_root: &Path, retention: usize) -> Self {
        Self {
            configs_root: output_root.join("configs"),
            retention,
            fresh: FreshnessMemo::new(Duration::from_secs(5)),
        }
    }

    pub fn configs_root(&self) -> &Path {
        &self.configs_root
    }

    pub fn dir_path(&self, name: &str) -> PathBuf {
        self.configs_root.join(name)
    }

    /// Staging area for a pass; published via rename on success
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.configs_root.join(format!(".staging-{}", name))
    }

    /// Whether the artifact directory for this fingerprint already contains
    /// the expected generated files. Best-effort: existence checks, not a
    /// lock.
    pub fn is_reusable(&mut self, name: &str) -> bool {
        if self.fresh.is_fresh(name) {
            return true;
        }
        let dir = self.dir_path(name);
        let complete = dir.join(DI_CONFIG_FILE).is_file()
            && dir.join(REGISTRY_FILE).is_file()
            && dir.join(TRANSFORMED_DIR).is_dir()
            && dir.join(META_FILE).is_file();
        if complete {
            self.fresh.mark(name);
        }
        complete
    }

    /// Delete the artifact directory unconditionally
    pub fn force_remove(&mut self, name: &str) -> Result<(), CodegenError> {
        self.fresh.forget(name);
        let dir = self.dir_path(name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Atomically publish a fully-written staging directory under `name`
    pub fn publish(&mut self, name: &str, staging: &Path) -> Result<PathBuf, CodegenError> {
        std::fs::create_dir_all(&self.configs_root)?;
        let _guard = self.acquire_lock()?;

        let target = self.dir_path(name);
        if target.exists() {
            std::fs::remove_dir_all(&target)?;
        }
        std::fs::rename(staging, &target)?;
        self.fresh.mark(name);
        Ok(target)
    }

    fn acquire_lock(&self) -> Result<LockGuard, CodegenError> {
        let path = self.configs_root.join(LOCK_FILE);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => Ok(LockGuard { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if lock_is_stale(&path) {
                    tracing::warn!(lock = %path.display(), "taking over stale artifact lock");
                    std::fs::remove_file(&path)?;
                    std::fs::OpenOptions::new()
                        .write(true)
                        .create_new(true)
                        .open(&path)?;
                    Ok(LockGuard { path })
                } else {
                    Err(CodegenError::Locked {
                        path: path.display().to_string(),
                    })
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Keep only the K most-recently-modified artifact directories for a
    /// project, deleting older ones
    pub fn apply_retention(&self, project: &str) -> Result<usize, CodegenError> {
        if !self.configs_root.exists() {
            return Ok(0);
        }
        let prefix = format!("{}-", project);
        let mut dirs: Vec<(PathBuf, SystemTime)> = Vec::new();
        for entry in std::fs::read_dir(&self.configs_root)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // The remainder after the prefix must be exactly a hash, or the
            // prefix alone would also match sibling projects like `shop-eu`
            let is_artifact = name.strip_prefix(&prefix).is_some_and(|rest| {
                rest.len() == HASH_PREFIX_LEN && rest.chars().all(|c| c.is_ascii_hexdigit())
            });
            if !entry.file_type()?.is_dir() || !is_artifact {
                continue;
            }
            let modified = entry
                .metadata()?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            dirs.push((entry.path(), modified));
        }
        dirs.sort_by(|a, b| b.1.cmp(&a.1));

        let mut removed = 0;
        for (path, _) in dirs.into_iter().skip(self.retention) {
            std::fs::remove_dir_all(&path)?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn write_meta(&self, dir: &Path, meta: &ConfigMeta) -> Result<(), CodegenError> {
        let content = serde_json::to_string_pretty(meta)?;
        std::fs::write(dir.join(META_FILE), content)?;
        Ok(())
    }

    pub fn read_meta(&self, name: &str) -> Result<ConfigMeta, CodegenError> {
        let content = std::fs::read_to_string(self.dir_path(name).join(META_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn lock_is_stale(path: &Path) -> bool {
    path.metadata()
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.elapsed().ok())
        .is_some_and(|age| age > STALE_LOCK)
}

/// Removes the lock file when the publishing scope ends
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release artifact lock");
        }
    }
}
