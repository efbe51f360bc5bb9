//! The effective scan configuration a generation pass runs under.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wirec_core::{HeuristicConfig, MarkerStrategy};

use crate::error::CodegenError;

/// Everything that shapes a generation pass. The fingerprint covers the
/// subset that affects generated output; flags like `force_regenerate` only
/// steer the pass itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveOptions {
    /// Project identifier, part of the artifact directory name
    pub project: String,
    pub scan_roots: Vec<PathBuf>,
    pub output_root: PathBuf,
    #[serde(default)]
    pub feature_flags: Vec<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Permit reusing an existing artifact directory
    #[serde(default = "default_true")]
    pub reuse: bool,
    /// Delete the artifact directory and rebuild unconditionally
    #[serde(default)]
    pub force_regenerate: bool,
    /// Keep only the K most-recently-modified artifact directories
    #[serde(default = "default_retention")]
    pub retention: usize,
    /// Enable the "looks like a service" marker fallback
    #[serde(default)]
    pub heuristic_markers: bool,
    /// Override the default heuristic suffix list
    #[serde(default)]
    pub heuristic_suffixes: Vec<String>,
    /// Extra project-specific regex for the heuristic
    #[serde(default)]
    pub heuristic_pattern: Option<String>,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retention() -> usize {
    3
}

impl EffectiveOptions {
    pub fn new(project: impl Into<String>, scan_roots: Vec<PathBuf>, output_root: PathBuf) -> Self {
        Self {
            project: project.into(),
            scan_roots,
            output_root,
            feature_flags: Vec::new(),
            environment: default_environment(),
            reuse: true,
            force_regenerate: false,
            retention: default_retention(),
            heuristic_markers: false,
            heuristic_suffixes: Vec::new(),
            heuristic_pattern: None,
        }
    }

    /// The marker strategy this configuration selects. Fails when the
    /// configured extra pattern does not compile.
    pub fn marker_strategy(&self) -> Result<MarkerStrategy, CodegenError> {
        if !self.heuristic_markers {
            return Ok(MarkerStrategy::Strict);
        }
        let mut config = HeuristicConfig::default();
        if !self.heuristic_suffixes.is_empty() {
            config.suffixes = self.heuristic_suffixes.clone();
        }
        if let Some(pattern) = &self.heuristic_pattern {
            config = config.with_extra_pattern(pattern)?;
        }
        Ok(MarkerStrategy::StrictPlusHeuristic(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn heuristic_options() -> EffectiveOptions {
        let mut options =
            EffectiveOptions::new("shop", vec![PathBuf::from("src")], PathBuf::from("out"));
        options.heuristic_markers = true;
        options
    }

    #[test]
    fn strict_strategy_without_heuristic_flag() {
        let options = EffectiveOptions::new("shop", vec![], PathBuf::from("out"));
        assert!(matches!(
            options.marker_strategy().unwrap(),
            MarkerStrategy::Strict
        ));
    }

    #[test]
    fn configured_pattern_lands_in_the_strategy() {
        let mut options = heuristic_options();
        options.heuristic_pattern = Some("^Use[A-Z]".into());
        let MarkerStrategy::StrictPlusHeuristic(config) = options.marker_strategy().unwrap()
        else {
            panic!("expected heuristic strategy");
        };
        assert!(config.extra_pattern.is_some());
    }

    #[test]
    fn invalid_pattern_fails_strategy_selection() {
        let mut options = heuristic_options();
        options.heuristic_pattern = Some("[unclosed".into());
        assert!(options.marker_strategy().is_err());
    }
}
