//! Deterministic fingerprinting of the effective scan configuration.
//!
//! Two runs with the same scan roots (in any order, with any path spelling),
//! the same flags, and the same project identifier hash identically. Only a
//! coarse environment bucket participates so that, for example, two
//! non-production runs share a cache.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CodegenError;
use crate::options::EffectiveOptions;

/// Width of the hex prefix kept from the digest
pub const HASH_PREFIX_LEN: usize = 12;

/// The normalized inputs the digest covers, recorded in `.config-meta.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashInputs {
    pub project: String,
    /// `production` or `development`; finer-grained names are deliberately
    /// collapsed
    pub environment: String,
    pub feature_flags: Vec<String>,
    pub scan_roots: Vec<String>,
    pub heuristic_markers: bool,
    /// Empty unless the heuristic is enabled; the list only shapes output
    /// when it is consulted
    #[serde(default)]
    pub heuristic_suffixes: Vec<String>,
    #[serde(default)]
    pub heuristic_pattern: Option<String>,
}

/// A computed configuration fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hash: String,
    pub inputs: HashInputs,
}

impl Fingerprint {
    pub fn compute(options: &EffectiveOptions) -> Result<Self, CodegenError> {
        let mut scan_roots: Vec<String> = options
            .scan_roots
            .iter()
            .map(|p| normalize_root(p))
            .collect::<Result<_, _>>()?;
        scan_roots.sort();
        scan_roots.dedup();

        let mut feature_flags = options.feature_flags.clone();
        feature_flags.sort();
        feature_flags.dedup();

        let (mut heuristic_suffixes, heuristic_pattern) = if options.heuristic_markers {
            (
                options.heuristic_suffixes.clone(),
                options.heuristic_pattern.clone(),
            )
        } else {
            (Vec::new(), None)
        };
        heuristic_suffixes.sort();
        heuristic_suffixes.dedup();

        let inputs = HashInputs {
            project: options.project.clone(),
            environment: environment_bucket(&options.environment).to_string(),
            feature_flags,
            scan_roots,
            heuristic_markers: options.heuristic_markers,
            heuristic_suffixes,
            heuristic_pattern,
        };

        // Struct field order is fixed and every vector is sorted, so the
        // serialized form is deterministic
        let serialized = serde_json::to_vec(&inputs)?;
        let digest = Sha256::digest(&serialized);
        let hash = hex::encode(digest)[..HASH_PREFIX_LEN].to_string();

        Ok(Self { hash, inputs })
    }

    /// Artifact directory name: `<project>-<hash>`
    pub fn directory_name(&self) -> String {
        format!("{}-{}", self.inputs.project, self.hash)
    }
}

/// Coarse environment bucket: `production` is distinguished, everything else
/// shares `development`.
pub fn environment_bucket(environment: &str) -> &'static str {
    if environment == "production" {
        "production"
    } else {
        "development"
    }
}

/// Resolve to an absolute, component-normalized, forward-slash path
fn normalize_root(path: &Path) -> Result<String, CodegenError> {
    let absolute = std::path::absolute(path)?;
    let normalized: std::path::PathBuf = absolute.components().collect();
    Ok(normalized.display().to_string().replace('\\', "/"))
}
